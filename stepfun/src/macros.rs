/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use stepfun::{Role, sf_msg};
///
/// let message = sf_msg!(assistant => "Done.");
/// assert_eq!(message.role, Some(Role::Assistant));
/// assert_eq!(message.text(), "Done.");
/// ```
#[macro_export]
macro_rules! sf_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::system($content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::user($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::assistant($content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant; tool messages need a function name");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use stepfun::{Role, sf_messages};
///
/// let messages = sf_messages![
///     system => "You are concise.",
///     user => "What is the weather in Paris?",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Some(Role::System));
/// assert_eq!(messages[1].role, Some(Role::User));
/// ```
#[macro_export]
macro_rules! sf_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::sf_msg!($role => $content)),+]
    };
}

/// Creates a [`Prompt`](crate::Prompt) from role/content pairs.
///
/// ```rust
/// use stepfun::sf_prompt;
///
/// let prompt = sf_prompt![user => "hello"];
/// assert_eq!(prompt.messages.len(), 1);
/// assert!(prompt.request_id.is_none());
/// ```
#[macro_export]
macro_rules! sf_prompt {
    ($($role:ident => $content:expr),+ $(,)?) => {
        $crate::Prompt::new($crate::sf_messages![$($role => $content),+])
    };
}

//! Values shared by the StepFun provider, tooling, and chat crates.
//!
//! ```rust
//! use sfcommon::{FunctionTable, RequestId};
//!
//! let request = RequestId::from("req-1");
//! let mut functions = FunctionTable::new();
//! assert!(functions.insert_if_absent("weather", 1_u8));
//! assert!(!functions.insert_if_absent("weather", 2_u8));
//!
//! assert_eq!(request.to_string(), "req-1");
//! assert_eq!(functions.get("weather"), Some(&1));
//! ```

pub mod future {
    //! Boxed futures returned from provider and tool trait objects.

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Correlation id carried by every model round and tool call of one conversation.
    //!
    //! ```rust
    //! use sfcommon::RequestId;
    //!
    //! let generated = RequestId::generate();
    //! assert!(!generated.as_str().is_empty());
    //! assert_ne!(generated, RequestId::generate());
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    /// Flattened generation metadata such as `finish_reason`.
    pub type MetadataMap = HashMap<String, String>;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct RequestId(String);

    impl RequestId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        /// Creates a random identifier for prompts the caller did not tag.
        pub fn generate() -> Self {
            Self(crate::ids::fresh_id())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }

        pub fn into_string(self) -> String {
            self.0
        }
    }

    impl Display for RequestId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for RequestId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for RequestId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod ids {
    /// UUID v4 string, used for request ids and for tool calls the model sent without an id.
    pub fn fresh_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

pub mod functions {
    //! Function-name keyed lookup shared by tool registries.

    use std::collections::HashMap;

    #[derive(Debug, Clone)]
    pub struct FunctionTable<V> {
        entries: HashMap<String, V>,
    }

    impl<V> Default for FunctionTable<V> {
        fn default() -> Self {
            Self {
                entries: HashMap::new(),
            }
        }
    }

    impl<V> FunctionTable<V> {
        pub fn new() -> Self {
            Self::default()
        }

        /// Replaces any entry already registered under `name`.
        pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
            self.entries.insert(name.into(), value)
        }

        /// Keeps the existing entry and returns `false` when `name` is taken.
        pub fn insert_if_absent(&mut self, name: impl Into<String>, value: V) -> bool {
            let name = name.into();
            if self.entries.contains_key(&name) {
                return false;
            }

            self.entries.insert(name, value);
            true
        }

        pub fn get(&self, name: &str) -> Option<&V> {
            self.entries.get(name)
        }

        pub fn contains(&self, name: &str) -> bool {
            self.entries.contains_key(name)
        }

        /// Function names in sorted order.
        pub fn names(&self) -> Vec<String> {
            let mut names = self.entries.keys().cloned().collect::<Vec<_>>();
            names.sort();
            names
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }
    }
}

pub use context::{MetadataMap, RequestId};
pub use functions::FunctionTable;
pub use future::BoxFuture;
pub use ids::fresh_id;

#[cfg(test)]
mod tests {
    use super::{FunctionTable, RequestId, fresh_id};

    #[test]
    fn request_id_renders_as_given() {
        let request = RequestId::new("req-1");

        assert_eq!(request.as_str(), "req-1");
        assert_eq!(request.to_string(), "req-1");
        assert_eq!(request.into_string(), "req-1");
    }

    #[test]
    fn fresh_ids_are_uuids() {
        let first = fresh_id();

        assert_eq!(first.len(), 36);
        assert_ne!(first, fresh_id());
    }

    #[test]
    fn first_registration_of_a_function_wins() {
        let mut table = FunctionTable::new();
        assert!(table.is_empty());

        assert!(table.insert_if_absent("weather", "first"));
        assert!(!table.insert_if_absent("weather", "second"));
        assert_eq!(table.get("weather"), Some(&"first"));

        assert_eq!(table.insert("weather", "replaced"), Some("first"));
        table.insert("clock", "noon");
        assert!(table.contains("clock"));
        assert_eq!(table.names(), vec!["clock", "weather"]);
        assert_eq!(table.len(), 2);
    }
}

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// One activation record for one invocation of a behavior. Typically an object, or `Null`
/// for the synthesized "no records" invocation.
pub type Config = Value;

/// A set of `name -> configs` pairs submitted to the dispatcher in one call. Entries keep
/// their insertion order; dispatch follows it. Deserializing from a JSON object keeps the
/// document order of the keys, which is how the producing side controls invocation order
/// across behaviors.
#[derive(Debug, Default, PartialEq)]
pub struct Batch {
    entries: Vec<(String, Vec<Config>)>,
}

impl Batch {
    pub fn new() -> Self {
        Batch { entries: Vec::new() }
    }

    /// Adds an entry. If `name` is already present its configs are replaced in place and
    /// the entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, configs: Vec<Config>) -> &mut Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing_configs)) => *existing_configs = configs,
            None => self.entries.push((name, configs)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Config])> {
        self.entries.iter().map(|(name, configs)| (name.as_str(), configs.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Vec<Config>)> for Batch {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Config>)>>(iter: I) -> Self {
        let mut batch = Batch::new();
        for (name, configs) in iter {
            batch.insert(name, configs);
        }
        batch
    }
}

impl<'de> Deserialize<'de> for Batch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Deserialized entry by entry instead of through an intermediate map, as the map
        // would lose the document order of the keys.
        struct BatchVisitor;

        impl<'de> Visitor<'de> for BatchVisitor {
            type Value = Batch;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of behavior names to lists of configs")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut batch = Batch::new();
                while let Some((name, configs)) = map.next_entry::<String, Vec<Config>>()? {
                    batch.insert(name, configs);
                }
                Ok(batch)
            }
        }

        deserializer.deserialize_map(BatchVisitor)
    }
}

use crate::batch::{Batch, Config};
use crate::statics::Statics;
use serde_json::Value;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::{LazyLock, Mutex};
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

/// A registered control function: invoked once per activation record, together with the
/// behavior's persistent statics.
pub type ControlFn = Box<dyn FnMut(&Config, &mut Statics) + Send>;

// Names that alias inherited members on object-keyed hosts. Batches are commonly produced
// by such hosts, so these names are rejected at registration to keep the wire format
// portable.
const RESERVED_NAMES: [&str; 7] = [
    "toString",
    "hasOwnProperty",
    "valueOf",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toLocaleString",
    "constructor",
];

static GLOBAL_REGISTRY: LazyLock<Mutex<Registry>> = LazyLock::new(|| Mutex::new(Registry::new()));

/// The process-wide registry, behind a single mutex guarding registration and dispatch as
/// a unit. Hosts that wire dependencies explicitly can construct a [`Registry`] instead.
pub fn global() -> &'static Mutex<Registry> {
    &GLOBAL_REGISTRY
}

/// Stores behaviors by name and dispatches activation batches to them.
///
/// A behavior is glue code registered once and invoked zero or more times, each time with
/// one config and with the same per-name [`Statics`] across all invocations for the
/// process lifetime. The registry also tracks which names went through the dispatcher at
/// least once, so that re-submitting a "no records" activation for an already-activated
/// name stays a no-op.
#[derive(Default)]
pub struct Registry {
    controls: HashMap<String, ControlFn>,
    statics: HashMap<String, Statics>,
    dispatched: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            controls: HashMap::new(),
            statics: HashMap::new(),
            dispatched: HashSet::new(),
        }
    }

    /// Registers `control` under `name` for later dispatch. The control function is not
    /// invoked here; a fresh empty statics container is created alongside it.
    ///
    /// With the `strict` feature disabled the duplicate and reserved-name checks are
    /// compiled out, and a duplicate registration silently overwrites the previous control
    /// function and its statics.
    pub fn register<F>(&mut self, name: &str, control: F) -> Result<(), BehaviorError>
    where
        F: FnMut(&Config, &mut Statics) + Send + 'static,
    {
        self.register_control(name, Box::new(control))
    }

    /// Registers a control function carried as a type-erased value, as handed over by
    /// dynamically assembled handler tables. `None` and values that are not a [`ControlFn`]
    /// are rejected; these capability checks are not gated by the `strict` feature.
    pub fn register_erased(&mut self, name: &str, control: Option<Box<dyn Any + Send>>) -> Result<(), BehaviorError> {
        let control = control.ok_or_else(|| BehaviorError::MissingHandler(name.to_owned()))?;
        let control = control.downcast::<ControlFn>().map_err(|_| BehaviorError::InvalidHandler(name.to_owned()))?;
        self.register_control(name, *control)
    }

    fn register_control(&mut self, name: &str, control: ControlFn) -> Result<(), BehaviorError> {
        #[cfg(feature = "strict")]
        {
            if self.controls.contains_key(name) {
                return Err(BehaviorError::DuplicateRegistration(name.to_owned()));
            }
            if RESERVED_NAMES.contains(&name) {
                return Err(BehaviorError::ReservedName(name.to_owned()));
            }
        }

        debug!("Registering behavior '{}'", name);
        self.controls.insert(name.to_owned(), control);
        self.statics.insert(name.to_owned(), Statics::new());
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.controls.contains_key(name)
    }

    pub fn behavior_names(&self) -> Vec<String> {
        self.controls.keys().cloned().collect()
    }

    /// Dispatches an activation batch: invokes each behavior once per config, in batch
    /// order for names and sequence order for configs within a name.
    ///
    /// A name with an empty config list fires once with a `Null` config the first time it
    /// is seen, and is skipped on later batches. A control function panic propagates to
    /// the caller as-is; behaviors later in the batch are then neither invoked nor marked
    /// dispatched, and the same holds for behaviors after an unknown name.
    #[instrument(skip_all, fields(batch_size = batch.len()))]
    pub fn run(&mut self, batch: &Batch) -> Result<(), BehaviorError> {
        info!("▶️ Dispatching {} behavior activation(s)...", batch.len());

        for (name, configs) in batch.iter() {
            #[cfg(feature = "strict")]
            if !self.controls.contains_key(name) {
                return Err(BehaviorError::UnknownBehavior(name.to_owned()));
            }

            let (Some(control), Some(statics)) = (self.controls.get_mut(name), self.statics.get_mut(name)) else {
                trace!("Skipping unknown behavior '{}'", name);
                continue;
            };

            if configs.is_empty() {
                if self.dispatched.contains(name) {
                    trace!("Behavior '{}' was already activated, skipping empty re-activation", name);
                } else {
                    debug!("Invoking behavior '{}' once without a config", name);
                    control(&Value::Null, statics);
                }
            } else {
                debug!("Invoking behavior '{}' for {} config(s)", name, configs.len());
                for config in configs {
                    control(config, statics);
                }
            }

            self.dispatched.insert(name.to_owned());
        }

        info!("▶️ Dispatching {} behavior activation(s)... OK", batch.len());
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum BehaviorError {
    #[error("behavior '{0}' is already registered")]
    DuplicateRegistration(String),
    #[error("behavior '{0}': a control function is required")]
    MissingHandler(String),
    #[error("behavior '{0}': the provided control function is not invocable")]
    InvalidHandler(String),
    #[error("behavior '{0}' is reserved, do not use any of: {names}", names = RESERVED_NAMES.join(", "))]
    ReservedName(String),
    #[error("behavior '{0}' is not registered")]
    UnknownBehavior(String),
}

//! The console: Cvars, commands, console objects and a dispatcher tied
//! together behind a text-parsing entry point.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use bevy::prelude::*;

use super::command::{Command, CommandInfo, ParamsCount};
use super::convert::IntoScalar;
use super::cvar::{Cvar, CvarCollection, CvarProvider};
use super::dispatcher::{CallbackKey, Dispatcher, OwnerId};
use super::event::IntoCallbackFn;
use super::events::{CommandSentEvent, ConsoleOutputEvent, ConsoleOutputLevel, CvarChangedEvent};
use super::ids::SequentialIdAllocator;
use super::tokenizer::{is_whitespace, nth_token, split};
use super::{ConsoleError, Result};
use crate::config::ConsoleConfig;

/// Id of an object living in the console.
pub type ObjectId = OwnerId;

/// An object owned by the [`Console`] whose listeners live and die with it.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use bevy_cvar_console::core::{
///     Console, ConsoleObject, Cvar, CvarChangedEvent, ObjectContext, Result, ValueKind,
/// };
///
/// struct VolumeWatcher {
///     volume: Arc<Mutex<f64>>,
/// }
///
/// impl ConsoleObject for VolumeWatcher {
///     fn on_creation(&mut self, ctx: &mut ObjectContext<'_>) -> Result<()> {
///         let volume = self.volume.clone();
///         ctx.add_cvar_listener("volume", move |event: &CvarChangedEvent| {
///             if let Ok(value) = event.cvar.get_as::<f64>() {
///                 *volume.lock().unwrap() = value;
///             }
///         })?;
///         Ok(())
///     }
/// }
///
/// let mut console = Console::default();
/// console.register_cvar(Cvar::new("volume", ValueKind::Float, 1.0).unwrap());
///
/// let volume = Arc::new(Mutex::new(1.0));
/// let watcher = VolumeWatcher { volume: volume.clone() };
/// let id = console.add_object(|_| watcher).unwrap();
///
/// console.set_cvar("volume", 0.25).unwrap();
/// assert_eq!(*volume.lock().unwrap(), 0.25);
///
/// console.remove_object(id);
/// console.set_cvar("volume", 0.5).unwrap();
/// assert_eq!(*volume.lock().unwrap(), 0.25);
/// ```
pub trait ConsoleObject: Any + Send + Sync {
    /// Called once the object is registered under its id.
    ///
    /// Returning an error removes the object again.
    fn on_creation(&mut self, ctx: &mut ObjectContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// Access to the console from inside [`ConsoleObject::on_creation`].
pub struct ObjectContext<'a> {
    console: &'a mut Console,
    id: ObjectId,
}

impl ObjectContext<'_> {
    /// The id of the object being created.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The console the object lives in.
    #[inline]
    pub fn console(&mut self) -> &mut Console {
        self.console
    }

    /// Listen for changes of `cvar_name` until the object is removed.
    pub fn add_cvar_listener<M>(
        &mut self,
        cvar_name: impl Into<String>,
        callback: impl IntoCallbackFn<CvarChangedEvent, M>,
    ) -> Result<CallbackKey> {
        self.console.add_owned_cvar_listener(self.id, cvar_name, callback)
    }

    /// Listen for the command `command_name` until the object is removed.
    pub fn add_command_listener<M>(
        &mut self,
        command_name: impl Into<String>,
        callback: impl IntoCallbackFn<CommandSentEvent, M>,
    ) -> Result<CallbackKey> {
        self.console.add_owned_command_listener(self.id, command_name, callback)
    }
}

/// Cvars, commands and console objects behind a text-parsing entry point.
///
/// Feedback for the user (echoed input, printed Cvars, errors) is buffered
/// and taken with [`Console::drain_output`].
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::{Console, Cvar, ValueKind};
///
/// let mut console = Console::default();
/// console.register_cvar(Cvar::new("sv_gravity", ValueKind::Float, 800).unwrap());
///
/// console.parse("sv_gravity 600.5");
/// assert_eq!(console.get_cvar("sv_gravity").unwrap().get_as_string(), "600.5");
///
/// console.parse("sv_gravity heavy");
/// assert_eq!(console.get_cvar("sv_gravity").unwrap().get_as_string(), "600.5");
/// ```
#[derive(Resource)]
pub struct Console {
    config: ConsoleConfig,
    cvars: CvarCollection,
    commands: BTreeMap<String, CommandInfo>,
    dispatcher: Dispatcher,
    object_ids: SequentialIdAllocator<ObjectId>,
    // An object is checked out (None) while its creation hook runs.
    objects: BTreeMap<ObjectId, Option<Box<dyn ConsoleObject>>>,
    output: Vec<ConsoleOutputEvent>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(ConsoleConfig::default())
    }
}

impl Console {
    /// Create an empty console.
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            config,
            cvars: CvarCollection::new(),
            commands: BTreeMap::new(),
            dispatcher: Dispatcher::new(),
            object_ids: SequentialIdAllocator::default(),
            objects: BTreeMap::new(),
            output: Vec::new(),
        }
    }

    /// Get the configuration.
    #[inline]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Replace the configuration. Applies from the next [`Console::parse`].
    pub fn set_config(&mut self, config: ConsoleConfig) {
        self.config = config;
    }

    // Cvars

    /// Merge the Cvars of provider `P`. Names already present keep their
    /// existing Cvar. Returns how many Cvars were added.
    pub fn init_cvars<P: CvarProvider>(&mut self) -> Result<usize> {
        let mut added = 0;
        for (name, cvar) in P::cvars()? {
            match self.cvars.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(cvar);
                    added += 1;
                }
                Entry::Occupied(existing) => {
                    debug!("Console: Keeping existing cvar '{}'", existing.key());
                }
            }
        }
        debug!("Console: Added {} cvars from {}", added, type_name::<P>());
        Ok(added)
    }

    /// Register a Cvar.
    ///
    /// Returns `false`, keeping the existing Cvar, if the name is taken.
    pub fn register_cvar(&mut self, cvar: Cvar) -> bool {
        match self.cvars.entry(cvar.name().to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(cvar);
                true
            }
            Entry::Occupied(existing) => {
                warn!("Console: Cvar '{}' is already registered", existing.key());
                false
            }
        }
    }

    /// Check if a Cvar exists.
    #[inline]
    pub fn contains_cvar(&self, name: &str) -> bool {
        self.cvars.contains_key(name)
    }

    /// Look up a Cvar by name.
    pub fn get_cvar(&self, name: &str) -> Result<&Cvar> {
        self.cvars
            .get(name)
            .ok_or_else(|| ConsoleError::NotFound(format!("cvar \"{name}\"")))
    }

    /// Iterate over all Cvars in name order.
    pub fn cvars(&self) -> impl Iterator<Item = &Cvar> {
        self.cvars.values()
    }

    /// Set a Cvar and notify its listeners.
    ///
    /// On failure the Cvar keeps its value and no listener is called.
    pub fn set_cvar<V: IntoScalar>(&mut self, name: &str, value: V) -> Result<()> {
        let cvar = self
            .cvars
            .get_mut(name)
            .ok_or_else(|| ConsoleError::NotFound(format!("cvar \"{name}\"")))?;

        let previous = cvar.value().clone();
        cvar.set(value)?;
        debug!("Console: {} changed from \"{}\"", cvar, previous);

        let event = CvarChangedEvent {
            cvar: cvar.clone(),
            previous,
        };
        self.dispatcher.dispatch(&event);
        Ok(())
    }

    /// Print a Cvar to the output.
    pub fn print_cvar(&mut self, name: &str) {
        let line = match self.cvars.get(name) {
            Some(cvar) => ConsoleOutputEvent::result(cvar.to_string()),
            None => ConsoleOutputEvent::error(format!("Cvar \"{name}\" doesn't exist")),
        };
        self.emit(line);
    }

    // Listeners

    /// Call `callback` whenever the Cvar `cvar_name` is set.
    pub fn add_cvar_listener<M>(
        &mut self,
        cvar_name: impl Into<String>,
        callback: impl IntoCallbackFn<CvarChangedEvent, M>,
    ) -> Result<CallbackKey> {
        let cvar_name = cvar_name.into();
        self.dispatcher.add_callback_if(callback, move |event: &CvarChangedEvent| {
            event.cvar.name() == cvar_name
        })
    }

    /// Call `callback` whenever the command `command_name` is sent.
    pub fn add_command_listener<M>(
        &mut self,
        command_name: impl Into<String>,
        callback: impl IntoCallbackFn<CommandSentEvent, M>,
    ) -> Result<CallbackKey> {
        let command_name = command_name.into();
        self.dispatcher.add_callback_if(callback, move |event: &CommandSentEvent| {
            event.command.name() == command_name
        })
    }

    /// Like [`Console::add_cvar_listener`], removed together with `object`.
    ///
    /// Fails with [`ConsoleError::NotFound`] if `object` does not exist.
    pub fn add_owned_cvar_listener<M>(
        &mut self,
        object: ObjectId,
        cvar_name: impl Into<String>,
        callback: impl IntoCallbackFn<CvarChangedEvent, M>,
    ) -> Result<CallbackKey> {
        self.require_object(object)?;
        let cvar_name = cvar_name.into();
        self.dispatcher
            .add_owned_callback_if(object, callback, move |event: &CvarChangedEvent| {
                event.cvar.name() == cvar_name
            })
    }

    /// Like [`Console::add_command_listener`], removed together with `object`.
    ///
    /// Fails with [`ConsoleError::NotFound`] if `object` does not exist.
    pub fn add_owned_command_listener<M>(
        &mut self,
        object: ObjectId,
        command_name: impl Into<String>,
        callback: impl IntoCallbackFn<CommandSentEvent, M>,
    ) -> Result<CallbackKey> {
        self.require_object(object)?;
        let command_name = command_name.into();
        self.dispatcher
            .add_owned_callback_if(object, callback, move |event: &CommandSentEvent| {
                event.command.name() == command_name
            })
    }

    /// Remove a listener. Returns `false` if it did not exist.
    pub fn remove_listener(&mut self, key: CallbackKey) -> bool {
        self.dispatcher.remove_callback(key)
    }

    /// Get the dispatcher, to register or send application events.
    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Get mutable access to the dispatcher.
    #[inline]
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    // Objects

    /// Create an object under a fresh id and run its creation hook.
    ///
    /// `create` receives the id the object will live under.
    pub fn add_object<T: ConsoleObject>(
        &mut self,
        create: impl FnOnce(ObjectId) -> T,
    ) -> Result<ObjectId> {
        let id = self.object_ids.get()?;
        let mut object: Box<dyn ConsoleObject> = Box::new(create(id));
        self.objects.insert(id, None);

        let created = object.on_creation(&mut ObjectContext { console: self, id });
        if let Err(err) = created {
            warn!("Console: Creation of {} failed: {}", type_name::<T>(), err);
            if matches!(self.objects.get(&id), Some(None)) {
                self.remove_object(id);
            }
            return Err(err);
        }

        // The hook may have removed its own object, and a later add may have
        // reused the id. Only the untouched placeholder is ours to fill.
        match self.objects.get_mut(&id) {
            Some(slot) if slot.is_none() => *slot = Some(object),
            _ => {
                warn!(
                    "Console: {} removed object {} during creation",
                    type_name::<T>(),
                    id
                );
                return Err(ConsoleError::Creation(format!(
                    "console object {id} was removed during creation"
                )));
            }
        }
        debug!("Console: Added object {} ({})", id, type_name::<T>());
        Ok(id)
    }

    /// Drop an object and every listener it owns.
    ///
    /// Returns `false` if there was no such object.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        if self.objects.remove(&id).is_none() {
            return false;
        }
        self.object_ids.free(id);
        let listeners = self.dispatcher.remove_callbacks(id);
        debug!("Console: Removed object {} and {} listeners", id, listeners);
        true
    }

    /// Check if an object exists.
    #[inline]
    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of live objects.
    #[inline]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Borrow an object as its concrete type.
    pub fn object<T: ConsoleObject>(&self, id: ObjectId) -> Option<&T> {
        let object: &dyn Any = self.objects.get(&id)?.as_deref()?;
        object.downcast_ref::<T>()
    }

    fn require_object(&self, id: ObjectId) -> Result<()> {
        if self.contains_object(id) {
            Ok(())
        } else {
            Err(ConsoleError::NotFound(format!("console object {id}")))
        }
    }

    // Commands

    /// Register a command.
    ///
    /// Returns `false`, keeping the existing command, if the name is taken.
    pub fn register_command(&mut self, info: CommandInfo) -> bool {
        match self.commands.entry(info.name().to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(info);
                true
            }
            Entry::Occupied(existing) => {
                warn!("Console: Command '{}' is already registered", existing.key());
                false
            }
        }
    }

    /// Check if a command is registered.
    #[inline]
    pub fn contains_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Get a registered command's metadata.
    pub fn get_command(&self, name: &str) -> Option<&CommandInfo> {
        self.commands.get(name)
    }

    /// Iterate over all registered commands in name order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandInfo> {
        self.commands.values()
    }

    /// Send `cmd` to its listeners.
    ///
    /// Returns `false`, reporting the reason to the output, if the command is
    /// not registered or its argument count is not accepted.
    pub fn dispatch_command(&mut self, cmd: Command) -> bool {
        let Some(info) = self.commands.get(cmd.name()) else {
            self.emit(ConsoleOutputEvent::error(format!(
                "Unrecognized command: \"{}\"",
                cmd.name()
            )));
            return false;
        };

        if !info.accepts(cmd.len()) {
            let usage = format!("Usage: {} takes {}", info.name(), info.params());
            self.emit(ConsoleOutputEvent::warn(usage));
            return false;
        }

        let event = CommandSentEvent { command: cmd };
        self.dispatcher.dispatch(&event);
        true
    }

    // Input and output

    /// Interpret a line of input.
    ///
    /// - `<cvar>` prints the Cvar
    /// - `<cvar> <value...>` sets the Cvar to the rest of the line
    /// - `<command> <args...>` sends the command
    ///
    /// Anything else is reported as unrecognized. Blank input is ignored.
    pub fn parse(&mut self, input: &str) {
        let Some(first) = nth_token(input, 0, is_whitespace) else {
            return;
        };
        let name = &input[first.clone()];
        let rest = nth_token(input, 1, is_whitespace).map(|second| input[second.start..].trim_end());

        if self.config.echo_input {
            self.emit(ConsoleOutputEvent::command(format!("$ {}", input.trim())));
        }

        if self.cvars.contains_key(name) {
            match rest {
                Some(value) => match self.set_cvar(name, value) {
                    Ok(()) => self.print_cvar(name),
                    Err(err) => {
                        self.emit(ConsoleOutputEvent::error(format!("Cannot set \"{name}\": {err}")))
                    }
                },
                None => self.print_cvar(name),
            }
        } else if let Some(info) = self.commands.get(name) {
            let args: Vec<String> = match info.params() {
                ParamsCount::ConcatenateArgs => rest.map(str::to_owned).into_iter().collect(),
                _ => split(&input[first.end..], is_whitespace, Some(self.config.max_args))
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            };
            self.dispatch_command(Command::new(name, args));
        } else {
            self.emit(ConsoleOutputEvent::error(format!("Unrecognized command: \"{name}\"")));
        }
    }

    /// Write a line to the output.
    pub fn emit(&mut self, output: ConsoleOutputEvent) {
        if self.config.log_output {
            match output.level {
                ConsoleOutputLevel::Warn => warn!("{}", output.message),
                ConsoleOutputLevel::Error => error!("{}", output.message),
                _ => info!("{}", output.message),
            }
        }
        self.output.push(output);
    }

    /// Output written since the last drain.
    #[inline]
    pub fn output(&self) -> &[ConsoleOutputEvent] {
        &self.output
    }

    /// Take the buffered output.
    pub fn drain_output(&mut self) -> Vec<ConsoleOutputEvent> {
        std::mem::take(&mut self.output)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::{TypedValue, ValueKind, cvar_collection};

    fn console() -> Console {
        let mut console = Console::new(ConsoleConfig::default().log_output(false));
        console.register_cvar(Cvar::new("sv_gravity", ValueKind::Float, 800).unwrap());
        console.register_cvar(Cvar::new("name", ValueKind::String, "player").unwrap());
        console.register_cvar(Cvar::with_default("frags", ValueKind::Integer));
        console
    }

    fn messages(console: &mut Console) -> Vec<String> {
        console.drain_output().into_iter().map(|out| out.message).collect()
    }

    struct Defaults;

    impl CvarProvider for Defaults {
        fn cvars() -> Result<CvarCollection> {
            Ok(cvar_collection([
                Cvar::new("sv_gravity", ValueKind::Float, 1)?,
                Cvar::new("fov", ValueKind::Integer, 90)?,
            ]))
        }
    }

    #[test]
    fn test_init_cvars_first_wins() {
        let mut console = console();
        assert_eq!(console.init_cvars::<Defaults>().unwrap(), 1);
        assert_eq!(console.get_cvar("sv_gravity").unwrap().get_as_string(), "800");
        assert_eq!(console.get_cvar("fov").unwrap().get_as::<i32>().unwrap(), 90);
        assert_eq!(console.init_cvars::<Defaults>().unwrap(), 0);
    }

    #[test]
    fn test_register_cvar_duplicate() {
        let mut console = console();
        assert!(!console.register_cvar(Cvar::new("frags", ValueKind::Integer, 5).unwrap()));
        assert_eq!(console.get_cvar("frags").unwrap().get_as_string(), "0");
        assert_eq!(console.cvars().count(), 3);
    }

    #[test]
    fn test_get_cvar_not_found() {
        let console = console();
        assert!(matches!(console.get_cvar("missing"), Err(ConsoleError::NotFound(_))));
    }

    #[test]
    fn test_set_cvar_notifies_listener() {
        let mut console = console();
        let changes = Arc::new(Mutex::new(Vec::new()));

        let log = changes.clone();
        console
            .add_cvar_listener("sv_gravity", move |event: &CvarChangedEvent| {
                log.lock()
                    .unwrap()
                    .push((event.previous.get_as_string(), event.cvar.get_as_string()));
            })
            .unwrap();

        console.set_cvar("sv_gravity", 600).unwrap();
        console.set_cvar("frags", 1).unwrap();

        assert_eq!(
            *changes.lock().unwrap(),
            [("800".to_owned(), "600".to_owned())]
        );
    }

    #[test]
    fn test_set_cvar_failure_is_silent() {
        let mut console = console();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        console
            .add_cvar_listener("sv_gravity", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(console.set_cvar("sv_gravity", "heavy").unwrap_err().is_conversion());
        assert!(matches!(
            console.set_cvar("missing", 1),
            Err(ConsoleError::NotFound(_))
        ));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            console.get_cvar("sv_gravity").unwrap().value(),
            &TypedValue::Float(800.0)
        );
    }

    #[test]
    fn test_remove_listener() {
        let mut console = console();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let key = console
            .add_cvar_listener("frags", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        console.set_cvar("frags", 1).unwrap();
        assert!(console.remove_listener(key));
        assert!(!console.remove_listener(key));
        console.set_cvar("frags", 2).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_sets_cvar() {
        let mut console = console();
        console.parse("  name   John   Smith  ");
        assert_eq!(console.get_cvar("name").unwrap().get_as_string(), "John   Smith");
        assert_eq!(
            messages(&mut console),
            ["$ name   John   Smith", "\"name\" = \"John   Smith\""]
        );
    }

    #[test]
    fn test_parse_prints_cvar() {
        let mut console = console();
        console.parse("sv_gravity");
        let output = console.drain_output();
        assert_eq!(output.len(), 2);
        assert_eq!(output[1].level, ConsoleOutputLevel::Result);
        assert_eq!(output[1].message, "\"sv_gravity\" = \"800\"");
    }

    #[test]
    fn test_parse_rejected_value() {
        let mut console = console();
        console.parse("frags lots");
        assert_eq!(console.get_cvar("frags").unwrap().get_as_string(), "0");

        let output = console.drain_output();
        assert_eq!(output.last().unwrap().level, ConsoleOutputLevel::Error);
    }

    #[test]
    fn test_parse_unrecognized() {
        let mut console = Console::new(ConsoleConfig::default().echo_input(false).log_output(false));
        console.parse("bogus 1 2");
        console.parse("   ");
        assert_eq!(messages(&mut console), ["Unrecognized command: \"bogus\""]);
    }

    #[test]
    fn test_parse_dispatches_command() {
        let mut console = console();
        console.register_command(CommandInfo::new("kick", ParamsCount::Exactly(2)));
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = received.clone();
        console
            .add_command_listener("kick", move |event: &CommandSentEvent| {
                log.lock().unwrap().push(event.command.args().to_vec());
            })
            .unwrap();

        console.parse("kick player1 cheating");
        console.parse("kick player1");
        console.parse("kick a b c");

        assert_eq!(
            *received.lock().unwrap(),
            [vec!["player1".to_owned(), "cheating".to_owned()]]
        );
    }

    #[test]
    fn test_parse_concatenates_args() {
        let mut console = console();
        console.register_command(CommandInfo::new("say", ParamsCount::ConcatenateArgs));
        let said = Arc::new(Mutex::new(Vec::new()));

        let log = said.clone();
        console
            .add_command_listener("say", move |event: &CommandSentEvent| {
                log.lock().unwrap().push(event.command.join(""));
            })
            .unwrap();

        console.parse("say  hello   there ");
        console.parse("say");

        assert_eq!(*said.lock().unwrap(), ["hello   there"]);
    }

    #[test]
    fn test_parse_caps_args() {
        let mut console = Console::new(ConsoleConfig::default().max_args(2).log_output(false));
        console.register_command(CommandInfo::new("many", ParamsCount::Any));
        let counts = Arc::new(Mutex::new(Vec::new()));

        let log = counts.clone();
        console
            .add_command_listener("many", move |event: &CommandSentEvent| {
                log.lock().unwrap().push(event.command.len());
            })
            .unwrap();

        console.parse("many a b c d");
        assert_eq!(*counts.lock().unwrap(), [2]);
    }

    #[test]
    fn test_dispatch_command() {
        let mut console = console();
        assert!(console.register_command(CommandInfo::new("quit", ParamsCount::Exactly(0))));
        assert!(!console.register_command(CommandInfo::new("quit", ParamsCount::Any)));
        assert_eq!(console.get_command("quit").unwrap().params(), ParamsCount::Exactly(0));

        assert!(console.dispatch_command(Command::parse("quit").unwrap()));
        assert!(!console.dispatch_command(Command::parse("quit now").unwrap()));
        assert!(!console.dispatch_command(Command::parse("unknown").unwrap()));
    }

    struct Counter {
        hits: Arc<AtomicUsize>,
    }

    impl ConsoleObject for Counter {
        fn on_creation(&mut self, ctx: &mut ObjectContext<'_>) -> Result<()> {
            let hits = self.hits.clone();
            ctx.add_cvar_listener("frags", move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })?;
            let hits = self.hits.clone();
            ctx.add_command_listener("ping", move || {
                hits.fetch_add(100, Ordering::SeqCst);
            })?;
            Ok(())
        }
    }

    struct Broken;

    impl ConsoleObject for Broken {
        fn on_creation(&mut self, _ctx: &mut ObjectContext<'_>) -> Result<()> {
            Err(ConsoleError::InvalidArgument("broken".to_owned()))
        }
    }

    struct Plain(u8);

    impl ConsoleObject for Plain {}

    #[test]
    fn test_object_listeners_removed_with_object() {
        let mut console = console();
        console.register_command(CommandInfo::new("ping", ParamsCount::Any));
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Counter { hits: hits.clone() };
        let id = console.add_object(|_| counter).unwrap();
        assert!(console.contains_object(id));
        assert_eq!(console.dispatcher().owned_keys(id).count(), 2);

        console.set_cvar("frags", 3).unwrap();
        console.parse("ping");
        assert_eq!(hits.load(Ordering::SeqCst), 101);

        assert!(console.remove_object(id));
        assert!(!console.remove_object(id));
        assert!(console.dispatcher().is_empty());

        console.set_cvar("frags", 4).unwrap();
        console.parse("ping");
        assert_eq!(hits.load(Ordering::SeqCst), 101);
    }

    #[test]
    fn test_object_ids_reused() {
        let mut console = console();
        let a = console.add_object(Plain::from_id).unwrap();
        let b = console.add_object(Plain::from_id).unwrap();
        assert_ne!(a, b);
        assert_eq!(console.object::<Plain>(b).unwrap().0, b as u8);

        console.remove_object(a);
        assert_eq!(console.add_object(Plain::from_id).unwrap(), a);
        assert_eq!(console.object_count(), 2);
        assert!(console.object::<Counter>(a).is_none());
    }

    impl Plain {
        fn from_id(id: ObjectId) -> Self {
            Plain(id as u8)
        }
    }

    #[test]
    fn test_failed_creation_removes_object() {
        let mut console = console();
        assert!(console.add_object(|_| Broken).is_err());
        assert_eq!(console.object_count(), 0);
        assert_eq!(console.add_object(|_| Plain(0)).unwrap(), 0);
    }

    /// Removes itself during creation, optionally handing its id to a
    /// [`Counter`] created in its place.
    struct Vanishing {
        replacement: Option<Arc<AtomicUsize>>,
        fail: bool,
    }

    impl ConsoleObject for Vanishing {
        fn on_creation(&mut self, ctx: &mut ObjectContext<'_>) -> Result<()> {
            let id = ctx.id();
            ctx.console().remove_object(id);
            if let Some(hits) = self.replacement.take() {
                let replaced = ctx.console().add_object(|_| Counter { hits })?;
                assert_eq!(replaced, id);
            }
            if self.fail {
                return Err(ConsoleError::InvalidArgument("vanished".to_owned()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_self_removal_during_creation() {
        let mut console = console();
        let created = console.add_object(|_| Vanishing {
            replacement: None,
            fail: false,
        });
        assert!(matches!(created, Err(ConsoleError::Creation(_))));
        assert_eq!(console.object_count(), 0);
        assert!(!console.contains_object(0));
    }

    #[test]
    fn test_reused_id_survives_creation() {
        let mut console = console();
        console.register_command(CommandInfo::new("ping", ParamsCount::Any));
        let hits = Arc::new(AtomicUsize::new(0));

        let created = console.add_object(|_| Vanishing {
            replacement: Some(hits.clone()),
            fail: false,
        });
        assert!(matches!(created, Err(ConsoleError::Creation(_))));

        assert_eq!(console.object_count(), 1);
        assert!(console.object::<Counter>(0).is_some());
        assert!(console.object::<Vanishing>(0).is_none());
        assert_eq!(console.dispatcher().owned_keys(0).count(), 2);

        console.parse("ping");
        assert_eq!(hits.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_failed_creation_keeps_reused_id() {
        let mut console = console();
        let hits = Arc::new(AtomicUsize::new(0));

        let created = console.add_object(|_| Vanishing {
            replacement: Some(hits),
            fail: true,
        });
        assert!(matches!(created, Err(ConsoleError::InvalidArgument(_))));
        assert!(console.object::<Counter>(0).is_some());
        assert_eq!(console.dispatcher().owned_keys(0).count(), 2);
    }

    #[test]
    fn test_owned_listener_requires_object() {
        let mut console = console();
        assert!(matches!(
            console.add_owned_cvar_listener(42, "frags", || {}),
            Err(ConsoleError::NotFound(_))
        ));
        assert!(matches!(
            console.add_owned_command_listener(42, "ping", || {}),
            Err(ConsoleError::NotFound(_))
        ));
    }
}

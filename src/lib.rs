//! Typed console variables, a keyed event dispatcher and a minimal command
//! console for Bevy.
//!
//! Inspired by the Source Engine ConVar system, bevy_cvar_console provides:
//!
//! - **Cvar**: Named values of kind Float, Integer or String that convert
//!   any number or text written to them, rejecting lossy or invalid writes
//! - **Dispatcher**: Callbacks keyed by event type, removable by key or by
//!   owner, optionally gated by a predicate
//! - **Console**: Parses text input into Cvar writes or command events
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_cvar_console::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ConsolePlugin::default())
//!         .add_systems(Startup, setup_console)
//!         .run();
//! }
//!
//! fn setup_console(mut console: ResMut<Console>) {
//!     // Register a variable
//!     console.register_cvar(
//!         Cvar::new("sv_gravity", ValueKind::Float, 800)
//!             .unwrap()
//!             .description("World gravity"),
//!     );
//!
//!     // React to changes
//!     console
//!         .add_cvar_listener("sv_gravity", |event: &CvarChangedEvent| {
//!             info!("Gravity is now {}", event.cvar.get_as_string());
//!         })
//!         .unwrap();
//!
//!     // Register a command and listen for it
//!     console.register_command(
//!         CommandInfo::new("noclip", ParamsCount::Exactly(0)).description("Toggle noclip"),
//!     );
//!     console
//!         .add_command_listener("noclip", || info!("Noclip toggled!"))
//!         .unwrap();
//! }
//! ```

use bevy::prelude::*;

pub mod config;
pub mod core;

pub use config::ConsoleConfig;
pub use self::core::{
    CallbackKey, Command, CommandInfo, CommandSentEvent, ConEvent, Console, ConsoleError,
    ConsoleEventsPlugin, ConsoleInputEvent, ConsoleObject, ConsoleOutputEvent,
    ConsoleOutputLevel, Cvar, CvarChangedEvent, CvarCollection, CvarProvider, Dispatcher,
    FloatPrecision, ObjectContext, ObjectId, ParamsCount, TypedValue, ValueKind,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::ConsolePlugin;
    pub use crate::config::ConsoleConfig;
    pub use crate::core::{
        CommandInfo, CommandSentEvent, ConEvent, Console, ConsoleError, ConsoleInputEvent,
        ConsoleObject, ConsoleOutputEvent, ConsoleOutputLevel, Cvar, CvarChangedEvent,
        CvarCollection, CvarProvider, Dispatcher, ObjectContext, ParamsCount, TypedValue,
        ValueKind, cvar_collection,
    };
}

/// Main console plugin.
///
/// # Configuration
///
/// ```ignore
/// ConsolePlugin::default().with_config(ConsoleConfig::default().echo_input(false))
/// ```
#[derive(Default)]
pub struct ConsolePlugin {
    /// Configuration installed with the console.
    pub config: ConsoleConfig,
}

impl ConsolePlugin {
    /// Use `config` for the console.
    pub fn with_config(mut self, config: ConsoleConfig) -> Self {
        self.config = config;
        self
    }
}

impl Plugin for ConsolePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(Console::new(self.config.clone()))
            .add_plugins(core::ConsoleEventsPlugin);

        // 1. parse_console_input: feed input messages through Console::parse
        // 2. send_console_output: forward buffered output as messages
        app.add_systems(Update, (parse_console_input, send_console_output).chain());
    }
}

/// System that parses submitted console input.
///
/// The [`ConsoleConfig`] resource is the source of truth; edits to it are
/// copied into the [`Console`] before any input is parsed.
fn parse_console_input(
    mut input_events: MessageReader<ConsoleInputEvent>,
    config: Res<ConsoleConfig>,
    mut console: ResMut<Console>,
) {
    if config.is_changed() && console.config() != &*config {
        debug!("Console: Applying updated configuration");
        console.set_config(config.clone());
    }
    for event in input_events.read() {
        console.parse(&event.command);
    }
}

/// System that sends buffered console output.
fn send_console_output(
    mut console: ResMut<Console>,
    mut output_events: MessageWriter<ConsoleOutputEvent>,
) {
    if console.output().is_empty() {
        return;
    }
    for output in console.drain_output() {
        output_events.write(output);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Test resource collecting console output messages.
    #[derive(Resource, Default)]
    struct CapturedOutput(Vec<ConsoleOutputEvent>);

    fn capture_output(
        mut output_events: MessageReader<ConsoleOutputEvent>,
        mut captured: ResMut<CapturedOutput>,
    ) {
        captured.0.extend(output_events.read().cloned());
    }

    fn app_with(config: ConsoleConfig) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ConsolePlugin::default().with_config(config.log_output(false)));
        app.init_resource::<CapturedOutput>();
        app.add_systems(Update, capture_output.after(send_console_output));

        let mut console = app.world_mut().resource_mut::<Console>();
        console.register_cvar(
            Cvar::new("test_var", ValueKind::Integer, 42)
                .unwrap()
                .description("Test variable"),
        );
        console.register_command(CommandInfo::new("test_cmd", ParamsCount::Any));
        app
    }

    fn submit(app: &mut App, input: &str) {
        app.world_mut().write_message(ConsoleInputEvent::new(input));
        app.update();
    }

    fn captured(app: &App) -> Vec<String> {
        app.world()
            .resource::<CapturedOutput>()
            .0
            .iter()
            .map(|out| out.message.clone())
            .collect()
    }

    #[test]
    fn test_plugin_installs_resources() {
        let app = app_with(ConsoleConfig::default().max_args(3));
        assert_eq!(app.world().resource::<ConsoleConfig>().max_args, 3);
        assert_eq!(app.world().resource::<Console>().config().max_args, 3);
    }

    #[test]
    fn test_cvar_get_set_via_input() {
        let mut app = app_with(ConsoleConfig::default());
        submit(&mut app, "test_var 100");

        let console = app.world().resource::<Console>();
        assert_eq!(console.get_cvar("test_var").unwrap().get_as::<i32>().unwrap(), 100);
        assert_eq!(
            captured(&app),
            ["$ test_var 100", "\"test_var\" = \"100\" - Test variable"]
        );
    }

    #[test]
    fn test_cvar_changed_listener() {
        let mut app = app_with(ConsoleConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        app.world_mut()
            .resource_mut::<Console>()
            .add_cvar_listener("test_var", move |event: &CvarChangedEvent| {
                log.lock().unwrap().push(event.cvar.get_as::<i64>().unwrap());
            })
            .unwrap();

        submit(&mut app, "test_var 7.6");
        submit(&mut app, "test_var nope");

        assert_eq!(*seen.lock().unwrap(), [8]);
    }

    #[test]
    fn test_command_execution() {
        let mut app = app_with(ConsoleConfig::default());
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = received.clone();
        app.world_mut()
            .resource_mut::<Console>()
            .add_command_listener("test_cmd", move |event: &CommandSentEvent| {
                log.lock().unwrap().push(event.command.args().to_vec());
            })
            .unwrap();

        submit(&mut app, "test_cmd arg1 arg2");

        assert_eq!(
            *received.lock().unwrap(),
            [vec!["arg1".to_owned(), "arg2".to_owned()]]
        );
    }

    #[test]
    fn test_max_args_config() {
        let mut app = app_with(ConsoleConfig::default().max_args(1));
        let counts = Arc::new(Mutex::new(Vec::new()));

        let log = counts.clone();
        app.world_mut()
            .resource_mut::<Console>()
            .add_command_listener("test_cmd", move |event: &CommandSentEvent| {
                log.lock().unwrap().push(event.command.len());
            })
            .unwrap();

        submit(&mut app, "test_cmd a b c");
        assert_eq!(*counts.lock().unwrap(), [1]);
    }

    #[test]
    fn test_config_resource_changes_apply() {
        let mut app = app_with(ConsoleConfig::default());
        submit(&mut app, "test_var");
        assert_eq!(captured(&app), ["$ test_var", "\"test_var\" = \"42\" - Test variable"]);

        app.world_mut().resource_mut::<CapturedOutput>().0.clear();
        app.world_mut().resource_mut::<ConsoleConfig>().echo_input = false;
        submit(&mut app, "test_var");

        assert!(!app.world().resource::<Console>().config().echo_input);
        assert_eq!(captured(&app), ["\"test_var\" = \"42\" - Test variable"]);
    }

    #[test]
    fn test_unrecognized_command() {
        let mut app = app_with(ConsoleConfig::default().echo_input(false));
        submit(&mut app, "does_not_exist 1");

        let output = &app.world().resource::<CapturedOutput>().0;
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].level, ConsoleOutputLevel::Error);
        assert_eq!(output[0].message, "Unrecognized command: \"does_not_exist\"");
    }

    #[test]
    fn test_output_is_drained() {
        let mut app = app_with(ConsoleConfig::default());
        submit(&mut app, "test_var");
        app.update();

        assert!(app.world().resource::<Console>().output().is_empty());
        assert_eq!(captured(&app).len(), 2);
    }

    #[test]
    fn test_multiple_inputs_in_one_frame() {
        let mut app = app_with(ConsoleConfig::default().echo_input(false));
        app.world_mut().write_message(ConsoleInputEvent::new("test_var 1"));
        app.world_mut().write_message(ConsoleInputEvent::new("test_var 2"));
        app.update();

        assert_eq!(
            captured(&app),
            ["\"test_var\" = \"1\" - Test variable", "\"test_var\" = \"2\" - Test variable"]
        );
    }
}

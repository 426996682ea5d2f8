//! Minimal headless console example.
//!
//! Registers Cvars from a provider, a command, and a console object that
//! listens to both, then drives everything through input messages.
//!
//! Run with: `cargo run --example minimal`

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use bevy_cvar_console::prelude::*;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(ConsolePlugin::default().with_config(ConsoleConfig::default().log_output(false)))
        .add_systems(Startup, setup)
        .add_systems(Update, process_outputs)
        .add_systems(Update, send_test_commands.run_if(run_once))
        .run();
}

struct WorldSettings;

impl CvarProvider for WorldSettings {
    fn cvars() -> Result<CvarCollection, ConsoleError> {
        Ok(cvar_collection([
            Cvar::new("sv_gravity", ValueKind::Float, 800)?.description("World gravity"),
            Cvar::new("sv_maxplayers", ValueKind::Integer, 16)?,
            Cvar::new("hostname", ValueKind::String, "bevy server")?,
        ]))
    }
}

/// Keeps its own copy of the gravity and reacts to `greet`.
struct Physics {
    gravity: Arc<Mutex<f32>>,
}

impl ConsoleObject for Physics {
    fn on_creation(&mut self, ctx: &mut ObjectContext<'_>) -> Result<(), ConsoleError> {
        let gravity = self.gravity.clone();
        ctx.add_cvar_listener("sv_gravity", move |event: &CvarChangedEvent| {
            if let (Ok(value), Ok(mut gravity)) = (event.cvar.get_as::<f32>(), gravity.lock()) {
                *gravity = value;
                println!("Physics gravity: {} (was {})", value, event.previous);
            }
        })?;
        ctx.add_command_listener("greet", |event: &CommandSentEvent| {
            let name = event.command.get(0).unwrap_or("World");
            println!("Hello, {}!", name);
        })?;
        Ok(())
    }
}

fn setup(mut console: ResMut<Console>) {
    if let Err(err) = console.init_cvars::<WorldSettings>() {
        error!("Failed to register world settings: {}", err);
        return;
    }

    console.register_command(
        CommandInfo::new("greet", ParamsCount::Any).description("Greet someone"),
    );
    console.register_command(
        CommandInfo::new("say", ParamsCount::ConcatenateArgs).description("Broadcast a message"),
    );

    let physics = Physics {
        gravity: Arc::new(Mutex::new(0.0)),
    };
    match console.add_object(|_| physics) {
        Ok(id) => println!("Console initialized. Physics object id: {}", id),
        Err(err) => error!("Failed to create physics object: {}", err),
    }
}

/// Send some test commands programmatically.
fn send_test_commands(mut events: MessageWriter<ConsoleInputEvent>) {
    println!("\n--- Sending test commands ---");

    // Query a variable
    events.write(ConsoleInputEvent::new("sv_gravity"));

    // Set a variable, then try a value it rejects
    events.write(ConsoleInputEvent::new("sv_gravity 1000"));
    events.write(ConsoleInputEvent::new("sv_maxplayers lots"));

    // Run commands
    events.write(ConsoleInputEvent::new("greet Developer"));
    events.write(ConsoleInputEvent::new("say hello   everyone"));
    events.write(ConsoleInputEvent::new("jump"));
}

/// Process and print console output events.
fn process_outputs(mut events: MessageReader<ConsoleOutputEvent>) {
    for event in events.read() {
        let prefix = match event.level {
            ConsoleOutputLevel::Info => "[INFO]",
            ConsoleOutputLevel::Warn => "[WARN]",
            ConsoleOutputLevel::Error => "[ERROR]",
            ConsoleOutputLevel::Command => "[$]",
            ConsoleOutputLevel::Result => "[>]",
        };
        println!("{} {}", prefix, event.message);
    }
}

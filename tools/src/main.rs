mod compose;
mod script;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use imbridge_core::{
    translate_raw_key, ClientConfig, EventType, FilterChain, FilterReturn, Host, ImContext,
    KeyEvent, MemorySettings, ModifierType, OffsetWindow, RawEvent, RawKeyEvent, TableKeymap,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use compose::ComposeEngine;
use script::{parse_script, Command};

/// Drive an input-method context from a script of focus, window, key and
/// settings commands, printing every signal the context relays.
#[derive(Parser)]
#[command(name = "imbridge-replay")]
struct Args {
    /// Script file with one command per line
    #[arg(long)]
    script: PathBuf,

    /// Client settings (TOML); defaults leave both hooks off
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print the effective settings as TOML before running
    #[arg(long)]
    print_settings: bool,
}

struct Replay {
    ctx: ImContext,
    engine: Rc<ComposeEngine>,
    chain: Rc<FilterChain>,
    settings: MemorySettings,
    keymap: Rc<TableKeymap>,
}

impl Replay {
    fn new(config: &ClientConfig) -> Self {
        let chain = Rc::new(FilterChain::new());
        let settings = MemorySettings::from_config(config);
        let keymap = Rc::new(TableKeymap::us());
        let host = Host {
            event_source: chain.clone(),
            settings: Rc::new(settings.clone()),
            keymap: keymap.clone(),
        };
        let engine = Rc::new(ComposeEngine::new());
        let ctx = ImContext::new(engine.clone(), host);
        connect_printers(&ctx);
        Self {
            ctx,
            engine,
            chain,
            settings,
            keymap,
        }
    }

    fn run(&self, cmd: &Command) {
        match cmd {
            Command::FocusIn => self.ctx.focus_in(),
            Command::FocusOut => self.ctx.focus_out(),
            Command::Window { x, y } => {
                self.ctx
                    .set_client_window(Some(Rc::new(OffsetWindow::new(*x, *y))));
            }
            Command::NoWindow => self.ctx.set_client_window(None),
            Command::Cursor(area) => {
                self.ctx.set_cursor_location(*area);
                println!("engine cursor: {:?}", self.engine.cursor_location());
            }
            Command::Key {
                event_type,
                keyval,
                keycode,
                state,
            } => {
                let consumed = self.ctx.filter_keypress(&key_event(*event_type, *keyval, *keycode, *state));
                println!("filter_keypress: {}", consumed);
            }
            Command::Raw {
                event_type,
                keycode,
                state,
            } => self.raw_key(*event_type, *keycode, *state),
            Command::Button(button) => {
                let ret = self.chain.dispatch(&RawEvent::ButtonPress {
                    button: *button,
                    state: ModifierType::empty(),
                });
                println!("button {}: {:?}", button, ret);
            }
            Command::Set { key, value } => {
                if !self.settings.set_boolean(key, *value) {
                    warn!("unknown setting '{}'", key);
                }
                println!("event filter installed: {}", self.ctx.has_event_filter());
            }
            Command::Reset => self.ctx.reset(),
            Command::Preedit => {
                let (preedit, attrs) = self.ctx.preedit_string_with_attributes();
                println!(
                    "preedit: {:?} cursor={} attrs={:?}",
                    preedit.text,
                    preedit.cursor_pos,
                    attrs.attributes()
                );
            }
            Command::UsePreedit(flag) => {
                self.ctx.set_use_preedit(*flag);
                println!("use-preedit: {}", self.engine.uses_preedit());
            }
            Command::Surrounding { text, cursor } => {
                self.ctx.set_surrounding(text, text.len() as i32, *cursor);
            }
            Command::GetSurrounding => println!("surrounding: {:?}", self.ctx.surrounding()),
            Command::DeleteSurrounding { offset, n_chars } => {
                let handled = self
                    .ctx
                    .input_method()
                    .signals()
                    .delete_surrounding
                    .emit_until_handled(&(*offset, *n_chars));
                println!("delete-surrounding handled: {}", handled);
            }
            Command::RetrieveSurrounding => {
                let handled = self
                    .ctx
                    .input_method()
                    .signals()
                    .retrieve_surrounding
                    .emit_until_handled(&());
                println!("retrieve-surrounding handled: {}", handled);
            }
        }
    }

    /// Raw keys go through the filter chain first; anything left over is
    /// delivered as a toolkit key event, as the windowing system would.
    fn raw_key(&self, event_type: EventType, keycode: u32, state: ModifierType) {
        let raw = RawKeyEvent {
            event_type,
            state,
            keycode,
        };
        let ret = self.chain.dispatch(&RawEvent::Key(raw));
        println!("raw {}: {:?}", keycode, ret);
        if ret == FilterReturn::Continue {
            let translated = translate_raw_key(&raw, self.keymap.as_ref());
            let consumed = self.ctx.filter_keypress(&key_event(
                event_type,
                translated.key.keyval,
                keycode,
                state,
            ));
            println!("filter_keypress: {}", consumed);
        }
    }
}

fn key_event(event_type: EventType, keyval: u32, keycode: u32, state: ModifierType) -> KeyEvent {
    match event_type {
        EventType::KeyPress => KeyEvent::press(keyval, keycode, state),
        EventType::KeyRelease => KeyEvent::release(keyval, keycode, state),
    }
}

fn connect_printers(ctx: &ImContext) {
    let signals = ctx.signals();
    signals
        .commit
        .connect(|text: &str| println!("commit: {:?}", text));
    signals
        .preedit_start
        .connect(|_: &()| println!("preedit-start"));
    signals
        .preedit_changed
        .connect(|_: &()| println!("preedit-changed"));
    signals
        .preedit_end
        .connect(|_: &()| println!("preedit-end"));
    signals
        .delete_surrounding
        .connect(|&(offset, n_chars): &(i32, i32)| {
            println!("delete-surrounding: offset={} n_chars={}", offset, n_chars);
            true
        });
    signals.retrieve_surrounding.connect(|_: &()| {
        println!("retrieve-surrounding");
        true
    });
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("IMBRIDGE_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.settings {
        Some(path) => ClientConfig::load_toml(path)?,
        None => ClientConfig::default(),
    };
    if args.print_settings {
        print!("{}", config.to_toml_string().context("serialize settings")?);
    }

    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("read script {}", args.script.display()))?;
    let commands = parse_script(&content)?;
    info!("replaying {} command(s)", commands.len());

    let replay = Replay::new(&config);
    for cmd in &commands {
        replay.run(cmd);
    }
    Ok(())
}

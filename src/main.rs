//! Role Gate Playground
//!
//! Drives a guarded profile view from the terminal:
//! - type a role tag to sign in as that role
//! - `signout` drops back to the unauthenticated state
//! - `unmount` / `mount` tear the view down or bring it back
//! - `status` shows the current address and identity

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

use role_gate::config::GateConfig;
use role_gate::gate::{Effects, EventBus, Frame, GatePolicy, GuardedView, Navigator, Notifier, ViewHandle, ViewRenderer};
use role_gate::identity::{Identity, IdentityProvider, SessionIdentity};
use role_gate::utils::init_tracing;

// ──────────────────────────────────────────────────────────────────────────────
// CONSOLE COLLABORATORS
// ──────────────────────────────────────────────────────────────────────────────

/// Pretend router: remembers the address it was last sent to
struct ConsoleNavigator {
    address: Mutex<String>,
}

impl ConsoleNavigator {
    fn new(start: &str) -> Self {
        Self { address: Mutex::new(start.to_string()) }
    }

    fn current(&self) -> String {
        self.address.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate_to(&self, address: &str) {
        if let Ok(mut current) = self.address.lock() {
            *current = address.to_string();
        }
        println!("🧭 Navigating to {}", address);
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, body: &str) {
        println!("🔔 {}: {}", title, body);
    }
}

struct ConsoleRenderer;

impl ViewRenderer for ConsoleRenderer {
    fn render(&self, frame: &Frame) {
        match frame {
            Frame::Loading => println!("⏳ Loading profile..."),
            Frame::Content { view, caption } => {
                println!("📄 [{}]", view);
                if let Some(caption) = caption {
                    println!("   {}", caption);
                }
            }
            Frame::Blank => {}
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    init_tracing("role_gate=info").context("Failed to initialize tracing")?;

    let config = GateConfig::from_env().context("Invalid ROLE_GATE_* configuration")?;
    info!(dashboard = %config.dashboard_address, "Configuration loaded");

    println!("\n{}", "═".repeat(60));
    println!("🔐 Role Gate Playground v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "═".repeat(60));
    println!("Roles: admin | service_provider | client | <anything else>");
    println!("Commands: signout | unmount | mount | status | quit");
    println!("{}\n", "═".repeat(60));

    let session = SessionIdentity::new();
    let navigator = Arc::new(ConsoleNavigator::new("/profile"));
    let effects = Effects::new(navigator.clone(), Arc::new(ConsoleNotifier));
    let bus = Arc::new(EventBus::new(config.event_capacity));

    let mount = |session: &SessionIdentity| -> ViewHandle {
        GuardedView::new(
            GatePolicy::from_config("profile", &config),
            effects.clone(),
            Arc::new(ConsoleRenderer),
        )
        .with_event_bus(bus.clone())
        .mount(session)
    };

    let mut view = Some(mount(&session));
    settle().await;

    loop {
        print!("👤 Role: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let command = input.trim();

        if command.is_empty() {
            continue;
        }

        match command.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("\n👋 Goodbye!\n");
                break;
            }
            "signout" => session.sign_out(),
            "unmount" => match view.as_mut() {
                Some(handle) => {
                    handle.unmount();
                    println!("🧹 View unmounted");
                }
                None => println!("Nothing mounted"),
            },
            "mount" => {
                if view.as_ref().is_some_and(|h| h.is_mounted()) {
                    println!("Already mounted");
                } else {
                    view = Some(mount(&session));
                }
            }
            "status" => {
                let mounted = view.as_ref().is_some_and(|h| h.is_mounted());
                println!(
                    "📍 address={} identity={} mounted={}",
                    navigator.current(),
                    session.snapshot(),
                    mounted
                );
            }
            _ => session.set(Identity::from_tag(command)),
        }

        settle().await;
    }

    if let Some(mut handle) = view.take() {
        handle.unmount();
        handle.closed().await;
    }

    Ok(())
}

/// Give the view task a moment to print before the next prompt
async fn settle() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}

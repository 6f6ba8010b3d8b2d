use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use threadnav_app_shell::NavigatorShell;
use threadnav_core::{DisplayMode, MemoryDocument, MessageId, NavigatorConfig, NodeId};
use threadnav_runtime_std::ManualClock;
use threadnav_ui::{format_panel, format_stats, RecordingRenderTarget};

type Shell = NavigatorShell<MemoryDocument, RecordingRenderTarget, ManualClock>;

const CHUNK_INTERVAL: Duration = Duration::from_millis(40);

const REPLY: &str = "Ownership means every value has a single owner, \
    and the value is dropped when that owner goes out of scope. \
    Borrowing lets other code look at it without taking it over.";

/// Appends one turn the way a chat page does: built detached, inserted once.
fn push_turn(doc: &Rc<RefCell<MemoryDocument>>, main: NodeId, role: &str, text: &str) -> NodeId {
    let mut doc = doc.borrow_mut();
    let article = doc.create_element("article");
    doc.set_attribute(article, "data-testid", "conversation-turn");
    let holder = doc.append_element(article, "div", &[("data-message-author-role", role)]);
    let paragraph = doc.append_element(holder, "p", &[]);
    let text = doc.append_text(paragraph, text);
    doc.append_child(main, article);
    text
}

fn print_panel(label: &str, shell: &Shell) {
    println!("-- {label}");
    println!("{}", format_panel(&shell.target().snapshot()));
    println!(
        "{}",
        format_stats(&shell.stats(), shell.context().last_key())
    );
}

fn main() {
    env_logger::init();

    let user_only = std::env::args().any(|arg| arg == "--user-only");
    let mode = if user_only {
        DisplayMode::UserOnly
    } else {
        DisplayMode::UserAndAssistant
    };

    let doc = Rc::new(RefCell::new(MemoryDocument::new()));
    let main = {
        let mut d = doc.borrow_mut();
        let body = d.body();
        d.append_element(body, "main", &[])
    };
    push_turn(&doc, main, "user", "What does ownership mean in Rust?");

    let config = NavigatorConfig::default().with_initial_mode(mode);
    let mut shell = match Shell::new(
        Rc::clone(&doc),
        RecordingRenderTarget::new(),
        ManualClock::new(),
        &config,
    ) {
        Ok(shell) => shell,
        Err(err) => {
            log::error!("invalid navigator config: {err}");
            std::process::exit(1);
        }
    };
    if shell.start().is_none() {
        log::error!("nothing to observe");
        return;
    }
    shell.settle();
    print_panel("initial", &shell);

    let reply = push_turn(&doc, main, "assistant", "");
    for word in REPLY.split_inclusive(' ') {
        doc.borrow_mut().push_text(reply, word);
        shell.advance(CHUNK_INTERVAL);
    }
    shell.settle();
    print_panel("after streaming", &shell);

    push_turn(&doc, main, "user", "And borrowing?");
    shell.settle();
    print_panel("follow-up", &shell);

    shell.set_mode(DisplayMode::UserOnly);
    shell.settle();
    print_panel("user-only", &shell);

    if shell.activate(&MessageId::from("ctn-0")) {
        log::info!("jumped to ctn-0");
    }
    shell.settle();
    shell.teardown();
}

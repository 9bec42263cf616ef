use std::{cell::Cell, process::ExitCode};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use sharebox::{ExclusiveBox, SharedBox, WeakBox, Widget, WidgetKind};

/// Walks through the ownership scenarios of the sharebox pointers.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log filter, e.g. `info` or `sharebox=trace`. RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Demo to run; all of them when omitted
    #[command(subcommand)]
    command: Option<Demo>,
}

#[derive(Subcommand)]
enum Demo {
    /// Move a value from one ExclusiveBox to another
    Exclusive {
        #[arg(long, default_value_t = 42)]
        value: i32,
    },
    /// Mutate a value through one SharedBox and read it through another
    Shared {
        #[arg(long, default_value_t = 10)]
        value: i32,
        #[arg(long, default_value_t = 100)]
        update: i32,
    },
    /// Observe a SharedBox through a WeakBox and promote it
    Weak {
        #[arg(long, default_value_t = 42)]
        value: i32,
        #[arg(long, default_value_t = 100)]
        update: i32,
    },
    /// Parent child widgets to a root through weak back-references
    Widgets {
        #[arg(long, default_value_t = 3)]
        children: usize,
        #[arg(long, value_enum, default_value_t = ChildKind::Tabbed)]
        kind: ChildKind,
    },
    /// Run every demo with its default values
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChildKind {
    Plain,
    Tabbed,
    Calendar,
}

impl From<ChildKind> for WidgetKind {
    fn from(kind: ChildKind) -> Self {
        match kind {
            ChildKind::Plain => WidgetKind::Plain,
            ChildKind::Tabbed => WidgetKind::Tabbed,
            ChildKind::Calendar => WidgetKind::Calendar,
        }
    }
}

fn exclusive(value: i32) -> Result<()> {
    let mut first = ExclusiveBox::new(value);
    info!("first -> {}", *first);

    let second = ExclusiveBox::take(&mut first);
    ensure!(
        ExclusiveBox::is_empty(&first),
        "first still owns a value after being moved from"
    );
    info!("first is empty");
    info!("second -> {}", ExclusiveBox::try_get(&second)?);
    Ok(())
}

fn shared(value: i32, update: i32) -> Result<()> {
    let p3 = SharedBox::new(Cell::new(value));
    info!("p3 -> {}, use count: {}", p3.get(), SharedBox::use_count(&p3));

    let p4 = p3.clone();
    info!("p4 -> {}, use count: {}", p4.get(), SharedBox::use_count(&p4));

    p4.set(update);
    info!("after modifying p4, p3 -> {}", p3.get());
    ensure!(p3.get() == update, "p3 did not observe the update through p4");
    Ok(())
}

fn weak(value: i32, update: i32) -> Result<()> {
    let owner = SharedBox::new(Cell::new(value));
    let observer: WeakBox<Cell<i32>> = SharedBox::downgrade(&owner);
    info!("owner use count: {}", SharedBox::use_count(&owner));
    info!("observer use count: {}", observer.use_count());

    match observer.upgrade() {
        Some(locked) => {
            locked.set(update);
            info!("value via locked handle: {}", locked.get());
            info!("owner use count while locked: {}", SharedBox::use_count(&owner));
        }
        None => info!("the object is no longer valid"),
    }
    info!("owner use count after lock: {}", SharedBox::use_count(&owner));
    info!("owner value: {}", owner.get());

    drop(owner);
    info!("owner dropped, observer expired: {}", observer.expired());
    ensure!(observer.expired(), "observer did not expire with its owner");
    Ok(())
}

fn widgets(children: usize, kind: WidgetKind) -> Result<()> {
    let root = SharedBox::new(Widget::plain());
    let children: Vec<_> = (0..children)
        .map(|_| SharedBox::new(Widget::new(kind)))
        .collect();
    for child in &children {
        child.set_parent(&root);
    }

    for (i, child) in children.iter().enumerate() {
        let parent = child.parent().lock();
        let parent = SharedBox::try_get(&parent)
            .with_context(|| format!("child {} lost its parent", i + 1))?;
        info!(
            "child {}: {}, parent: {}",
            i + 1,
            child.type_name(),
            parent.type_name()
        );
    }
    info!("root use count: {}", SharedBox::use_count(&root));

    drop(root);
    let orphans = children.iter().filter(|c| c.parent().expired()).count();
    info!("root dropped, {} of {} children see an expired parent", orphans, children.len());
    ensure!(orphans == children.len(), "a child kept its parent alive");
    Ok(())
}

fn all() -> Result<()> {
    exclusive(42)?;
    shared(10, 100)?;
    weak(42, 100)?;
    widgets(3, WidgetKind::Tabbed)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let result = match cli.command.unwrap_or(Demo::All) {
        Demo::Exclusive { value } => exclusive(value),
        Demo::Shared { value, update } => shared(value, update),
        Demo::Weak { value, update } => weak(value, update),
        Demo::Widgets { children, kind } => widgets(children, kind.into()),
        Demo::All => all(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

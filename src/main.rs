mod cli;
mod config;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use housepot::minimizer::round_cents;
use housepot::{
    IouEntry, Month, Participant, ParticipantId, Provenance, Roster, SalaryBook, SettlementResult,
    Snapshot, Transfer, check_snapshot, compute_ious, settle_snapshot, summarize,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, IouArgs, RosterCmd, SettleArgs, SourceFlags, SummaryArgs};
use crate::config::{AppConfig, app_paths, load_or_init_config, write_config};

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("HOUSEPOT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (mut cfg, cfg_path) = load_or_init_config(&paths)?;

    match cli.command {
        Command::Roster(args) => handle_roster(args.cmd, &mut cfg, &cfg_path),
        Command::Book(args) => {
            match args.path {
                Some(path) => {
                    cfg.book = Some(path.display().to_string());
                    write_config(&cfg_path, &cfg)?;
                    println!("Default book: {}", path.display());
                }
                None => match &cfg.book {
                    Some(book) => println!("{book}"),
                    None => println!("(no default book)"),
                },
            }
            Ok(())
        }
        Command::Settle(args) => handle_settle(args, &cfg, &cfg_path),
        Command::Ious(args) => handle_ious(args, &cfg, &cfg_path),
        Command::Summary(args) => handle_summary(args, &cfg, &cfg_path),
        Command::Check(args) => {
            let roster = cfg.roster()?;
            let book = resolve_book(args.book.as_deref(), &cfg, &cfg_path)?;
            let snapshot = load_book(&book)?;
            let findings = check_snapshot(&roster, &snapshot);
            if findings.is_empty() {
                println!("ok");
                return Ok(());
            }
            for f in &findings {
                println!("{}\t{}", describe(f.source), f.issue);
            }
            Err(anyhow!("{} issue(s) found in {}", findings.len(), book.display()))
        }
    }
}

fn handle_roster(cmd: RosterCmd, cfg: &mut AppConfig, cfg_path: &Path) -> Result<()> {
    match cmd {
        RosterCmd::Add { id, name } => {
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(anyhow!("Participant id must not be empty"));
            }
            let pid = ParticipantId::new(id.clone());
            if cfg.participants.iter().any(|p| p.id == pid) {
                return Err(anyhow!("Participant already exists: '{id}'"));
            }
            cfg.participants.push(Participant { id: pid, name });
            write_config(cfg_path, cfg)?;
            println!("Added participant: {id}");
        }
        RosterCmd::Remove { id } => {
            let pid = ParticipantId::new(id.trim());
            let before = cfg.participants.len();
            cfg.participants.retain(|p| p.id != pid);
            if cfg.participants.len() == before {
                return Err(anyhow!("No such participant: '{id}'"));
            }
            write_config(cfg_path, cfg)?;
            println!("Removed participant: {pid}");
        }
        RosterCmd::List => {
            if cfg.participants.is_empty() {
                println!("(no participants)");
            }
            for p in &cfg.participants {
                println!("{}\t{}", p.id, p.display_name());
            }
        }
    }
    Ok(())
}

struct Loaded {
    roster: Roster,
    snapshot: Snapshot,
    month: Month,
}

fn load_source(source: &SourceFlags, cfg: &AppConfig, cfg_path: &Path) -> Result<Loaded> {
    let roster = cfg.roster()?;
    let book = resolve_book(source.book.as_deref(), cfg, cfg_path)?;
    let snapshot = load_book(&book)?;
    Ok(Loaded {
        roster,
        snapshot,
        month: source.month.unwrap_or_else(Month::current),
    })
}

fn handle_settle(args: SettleArgs, cfg: &AppConfig, cfg_path: &Path) -> Result<()> {
    let Loaded {
        roster,
        snapshot,
        month,
    } = load_source(&args.source, cfg, cfg_path)?;

    let findings = check_snapshot(&roster, &snapshot);
    if args.strict && !findings.is_empty() {
        for f in &findings {
            eprintln!("{}\t{}", describe(f.source), f.issue);
        }
        return Err(anyhow!(
            "Refusing to settle: {} validation issue(s). Run `housepot check` for details",
            findings.len()
        ));
    }
    for f in &findings {
        warn!(source = %describe(f.source), issue = %f.issue, "book validation");
    }

    let result = settle_snapshot(month, &roster, &snapshot);
    if args.source.json {
        return print_json(&result);
    }
    print_settlement(&roster, &result);
    Ok(())
}

fn print_settlement(roster: &Roster, result: &SettlementResult) {
    println!("month\t{}", result.month);
    println!("total\t{}", money(result.total_expense));
    println!("participant\tsalary\tshare\tpaid\tbalance\toutside");
    for id in roster.ids() {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            id,
            money(result.salaries.get(id)),
            money(result.shares.get(id)),
            money(result.paid.get(id)),
            money(result.balances.get(id)),
            money(result.outside_settlement.get(id)),
        );
    }

    if result.is_settled() {
        println!("(settled)");
        return;
    }
    println!("from\tto\tamount");
    for t in &result.transfers {
        println!("{}\t{}\t{}", t.from, t.to, money(t.amount));
    }
}

fn handle_ious(args: IouArgs, cfg: &AppConfig, cfg_path: &Path) -> Result<()> {
    let Loaded {
        roster,
        snapshot,
        month,
    } = load_source(&args.source, cfg, cfg_path)?;

    let report = compute_ious(month, &snapshot.expenses, &snapshot.recurring, &roster);
    let focus = match args.participant.as_deref() {
        Some(raw) => {
            let id = ParticipantId::new(raw.trim());
            if !roster.contains(&id) {
                return Err(anyhow!("No such participant: '{raw}'"));
            }
            Some(id)
        }
        None => None,
    };

    let entries: Vec<&IouEntry> = match &focus {
        Some(id) => report.involving(id).collect(),
        None => report.entries.iter().collect(),
    };
    let net: Vec<Transfer> = report
        .net_positions(&roster)
        .into_iter()
        .filter(|t| focus.as_ref().is_none_or(|id| &t.from == id || &t.to == id))
        .collect();

    if args.source.json {
        return print_json(&IouView {
            month: report.month,
            entries,
            net,
        });
    }

    if entries.is_empty() {
        println!("(no ious)");
        return Ok(());
    }

    println!("creditor\tdebtor\tamount\tdate\tnote");
    for e in entries {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            e.creditor,
            e.debtor,
            money(e.amount),
            e.date,
            e.note
        );
    }

    println!("net\tfrom\tto\tamount");
    for t in net {
        println!("net\t{}\t{}\t{}", t.from, t.to, money(t.amount));
    }
    Ok(())
}

/// IOUs as shown to one reader: entries and pairwise nets, optionally
/// narrowed to one participant.
#[derive(Serialize)]
struct IouView<'a> {
    month: Month,
    entries: Vec<&'a IouEntry>,
    net: Vec<Transfer>,
}

fn handle_summary(args: SummaryArgs, cfg: &AppConfig, cfg_path: &Path) -> Result<()> {
    let Loaded {
        roster,
        snapshot,
        month,
    } = load_source(&args.source, cfg, cfg_path)?;

    let salaries = SalaryBook::new(snapshot.salaries.iter().cloned()).resolve(month);
    let summary = summarize(
        month,
        &snapshot.expenses,
        &snapshot.recurring,
        &salaries,
        &roster,
    );
    if args.source.json {
        return print_json(&summary);
    }

    println!("month\t{}", summary.month);
    println!("shared_total\t{}", money(summary.shared_total));
    println!("previous_shared_total\t{}", money(summary.previous_shared_total));
    println!("category\tamount");
    for c in &summary.category_totals {
        println!("{}\t{}", c.category, money(c.amount));
    }
    println!("participant\tincome\tspent\tsavings");
    for p in &summary.participants {
        println!(
            "{}\t{}\t{}\t{}",
            p.participant,
            money(p.income),
            money(p.spent),
            money(p.savings)
        );
    }
    Ok(())
}

fn resolve_book(flag: Option<&Path>, cfg: &AppConfig, cfg_path: &Path) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    match &cfg.book {
        Some(book) => Ok(PathBuf::from(book)),
        None => Err(anyhow!(
            "No book given. Pass --book <path>, set HOUSEPOT_BOOK, or run: housepot book <path> (config: {})",
            cfg_path.display()
        )),
    }
}

fn load_book(path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read book {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse book {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn describe(source: Provenance) -> String {
    match source {
        Provenance::Recorded(id) => format!("expense {id}"),
        Provenance::Recurring(id) => format!("recurring {id}"),
    }
}

/// Cents, without trailing zeros.
fn money(amount: Decimal) -> String {
    round_cents(amount).normalize().to_string()
}

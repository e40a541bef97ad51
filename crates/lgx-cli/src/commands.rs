//! # Shipment Subcommands
//!
//! Every mutating command follows the same path: load the session, rebuild
//! the tracker, subscribe a change flag, apply one operation, and save only
//! if the flag was raised. Guard rejections print `REJECTED: <reason>` and
//! return exit status 2 without touching the file.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use lgx_catalog::{MessageTable, MilestoneCatalog, YamlCatalog};
use lgx_core::{
    parse_calendar_date, Department, MilestoneId, ShipmentDirection, ShipmentRef, TransportMode,
};
use lgx_export::{render, ExportFormat, Snapshot};
use lgx_state::{MilestoneError, MilestoneSequence, MilestoneTracker, ReplacePolicy};

use crate::config::CliConfig;
use crate::render::{render_breakdown, render_next, render_pending, render_progress, render_status};
use crate::session::{Session, SessionStore};
use crate::theme::ThemeTokens;

/// Exit status for guard rejections.
pub const EXIT_REJECTED: u8 = 2;

/// Shipment and milestone a per-milestone command targets.
#[derive(Args, Debug, Clone)]
pub struct MilestoneTarget {
    /// Shipment reference (e.g. "SHP-2024-001").
    #[arg(long)]
    pub shipment: ShipmentRef,
    /// Milestone id (e.g. "customs_clearance").
    #[arg(long)]
    pub milestone: MilestoneId,
}

/// LGX subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a session for a shipment from a catalog template.
    Init {
        #[arg(long)]
        shipment: ShipmentRef,
        /// import or export.
        #[arg(long)]
        direction: ShipmentDirection,
        /// air or sea.
        #[arg(long)]
        mode: TransportMode,
        /// Select every milestone of the template.
        #[arg(long)]
        select_all: bool,
        /// YAML catalog to use instead of the configured one.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Toggle whether a milestone applies to the shipment.
    Select(MilestoneTarget),

    /// Mark a milestone complete.
    Complete(MilestoneTarget),

    /// Revert a completed milestone.
    Reactivate(MilestoneTarget),

    /// Set or clear a milestone date.
    Date {
        #[command(flatten)]
        target: MilestoneTarget,
        /// Calendar date, YYYY-MM-DD.
        #[arg(long, required_unless_present = "clear", conflicts_with = "clear")]
        value: Option<String>,
        /// Remove the date.
        #[arg(long)]
        clear: bool,
    },

    /// Set or clear milestone details.
    Details {
        #[command(flatten)]
        target: MilestoneTarget,
        /// Free text.
        #[arg(long, required_unless_present = "clear", conflicts_with = "clear")]
        text: Option<String>,
        /// Remove the details.
        #[arg(long)]
        clear: bool,
    },

    /// Assign the responsible agent. Omit --agent to clear.
    Assign {
        #[command(flatten)]
        target: MilestoneTarget,
        #[arg(long)]
        agent: Option<String>,
    },

    /// Show every milestone with its status.
    Status {
        #[arg(long)]
        shipment: ShipmentRef,
    },

    /// Show progress with category and department breakdown.
    Progress {
        #[arg(long)]
        shipment: ShipmentRef,
        /// Also list the pending milestones of one department.
        #[arg(long)]
        department: Option<Department>,
    },

    /// List all sessions in the state directory.
    List,

    /// Write a snapshot as JSON, YAML or CSV.
    Export {
        #[arg(long)]
        shipment: ShipmentRef,
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        /// Output file, or a directory to write `<shipment>.<format>` into;
        /// stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace the milestone template after a direction or mode change.
    Retype {
        #[arg(long)]
        shipment: ShipmentRef,
        #[arg(long)]
        direction: ShipmentDirection,
        #[arg(long)]
        mode: TransportMode,
        /// reset or reconcile.
        #[arg(long, default_value = "reconcile")]
        policy: ReplacePolicy,
    },
}

/// Collaborators shared by all handlers.
pub struct CliContext {
    pub store: SessionStore,
    pub localizer: MessageTable,
    pub theme: ThemeTokens,
    pub catalog: Box<dyn MilestoneCatalog>,
}

impl CliContext {
    pub fn from_config(config: &CliConfig) -> Result<Self> {
        Ok(Self {
            store: SessionStore::new(&config.state_dir),
            localizer: config.localizer()?,
            theme: ThemeTokens::for_name(config.theme),
            catalog: config.catalog()?,
        })
    }
}

/// Execute one subcommand.
pub fn run_command(command: &Commands, ctx: &CliContext) -> Result<u8> {
    match command {
        Commands::Init {
            shipment,
            direction,
            mode,
            select_all,
            catalog,
        } => cmd_init(ctx, shipment, *direction, *mode, *select_all, catalog.as_deref()),

        Commands::Select(t) => mutate(ctx, &t.shipment, |_, tracker| {
            let selected = tracker.toggle_selected(&t.milestone)?;
            let verb = if selected { "selected" } else { "deselected" };
            Ok(format!("milestone {} {verb}", t.milestone))
        }),

        Commands::Complete(t) => mutate(ctx, &t.shipment, |_, tracker| {
            tracker.complete(&t.milestone)?;
            Ok(format!("milestone {} completed ({})", t.milestone, tracker.progress()))
        }),

        Commands::Reactivate(t) => mutate(ctx, &t.shipment, |_, tracker| {
            tracker.reactivate(&t.milestone)?;
            Ok(format!("milestone {} reactivated ({})", t.milestone, tracker.progress()))
        }),

        Commands::Date { target, value, clear } => {
            let date = match value {
                Some(raw) if !*clear => Some(
                    parse_calendar_date(raw).with_context(|| format!("invalid --value {raw:?}"))?,
                ),
                _ => None,
            };
            mutate(ctx, &target.shipment, |_, tracker| match date {
                Some(date) => {
                    tracker.set_date(&target.milestone, date.as_str())?;
                    Ok(format!("milestone {} date set to {date}", target.milestone))
                }
                None => {
                    tracker.clear_date(&target.milestone)?;
                    Ok(format!("milestone {} date cleared", target.milestone))
                }
            })
        }

        Commands::Details { target, text, clear } => {
            mutate(ctx, &target.shipment, |_, tracker| match text.as_deref().filter(|_| !*clear) {
                Some(text) => {
                    tracker.set_details(&target.milestone, text)?;
                    Ok(format!("milestone {} details set", target.milestone))
                }
                None => {
                    tracker.clear_details(&target.milestone)?;
                    Ok(format!("milestone {} details cleared", target.milestone))
                }
            })
        }

        Commands::Assign { target, agent } => mutate(ctx, &target.shipment, |_, tracker| {
            tracker.assign_agent(&target.milestone, agent.clone())?;
            let assigned = tracker
                .sequence()
                .get(&target.milestone)
                .and_then(|m| m.agent_name.clone());
            Ok(match assigned {
                Some(name) => format!("milestone {} assigned to {name}", target.milestone),
                None => format!("milestone {} unassigned", target.milestone),
            })
        }),

        Commands::Status { shipment } => cmd_status(ctx, shipment),
        Commands::Progress {
            shipment,
            department,
        } => cmd_progress(ctx, shipment, *department),
        Commands::List => cmd_list(ctx),

        Commands::Export {
            shipment,
            format,
            out,
        } => cmd_export(ctx, shipment, *format, out.as_deref()),

        Commands::Retype {
            shipment,
            direction,
            mode,
            policy,
        } => cmd_retype(ctx, shipment, *direction, *mode, *policy),
    }
}

/// Load, apply `op`, save if the tracker notified a change.
fn mutate<F>(ctx: &CliContext, shipment: &ShipmentRef, op: F) -> Result<u8>
where
    F: FnOnce(&mut Session, &mut MilestoneTracker) -> Result<String, MilestoneError>,
{
    let mut session = ctx.store.load(shipment)?;
    let mut tracker = session.tracker()?;

    let changed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&changed);
    tracker.subscribe(move |_: &MilestoneSequence| flag.set(true));

    let message = match op(&mut session, &mut tracker) {
        Ok(message) => message,
        Err(err) if err.is_rejection() => {
            tracing::info!(%shipment, error = %err, "request rejected");
            println!("REJECTED: {err}");
            return Ok(EXIT_REJECTED);
        }
        Err(err) => return Err(err).with_context(|| format!("shipment {shipment}")),
    };

    if changed.get() {
        session.absorb(tracker);
        ctx.store.save(&session)?;
        tracing::info!(%shipment, "session updated");
    } else {
        tracing::debug!(%shipment, "no change; session left as is");
    }
    println!("OK: {message}");
    Ok(0)
}

fn cmd_init(
    ctx: &CliContext,
    shipment: &ShipmentRef,
    direction: ShipmentDirection,
    mode: TransportMode,
    select_all: bool,
    catalog_override: Option<&Path>,
) -> Result<u8> {
    if ctx.store.exists(shipment) {
        bail!("shipment already exists: {shipment}");
    }
    let definitions = match catalog_override {
        Some(path) => YamlCatalog::load(path)?.definitions(direction, mode)?,
        None => ctx.catalog.definitions(direction, mode)?,
    };
    let ids: Vec<MilestoneId> = definitions.iter().map(|d| d.id.clone()).collect();
    let mut tracker = MilestoneTracker::from_definitions(definitions)?;
    if select_all {
        for id in &ids {
            tracker.toggle_selected(id)?;
        }
    }
    let session = Session::new(shipment.clone(), direction, mode, tracker);
    ctx.store.create(&session)?;
    println!(
        "OK: created shipment {shipment} ({direction} {mode}, {} milestones{})",
        ids.len(),
        if select_all { ", all selected" } else { "" }
    );
    Ok(0)
}

fn cmd_status(ctx: &CliContext, shipment: &ShipmentRef) -> Result<u8> {
    let session = ctx.store.load(shipment)?;
    print!("{}", render_status(&session, &ctx.localizer, &ctx.theme));
    Ok(0)
}

fn cmd_progress(
    ctx: &CliContext,
    shipment: &ShipmentRef,
    department: Option<Department>,
) -> Result<u8> {
    let session = ctx.store.load(shipment)?;
    let progress = lgx_state::progress(&session.sequence);
    println!("{}", render_progress(&progress, &ctx.localizer, &ctx.theme));
    println!("{}", render_next(&session.sequence, &ctx.localizer, &ctx.theme));
    print!("{}", render_breakdown(&session.sequence, &ctx.localizer, &ctx.theme));
    if let Some(department) = department {
        print!(
            "{}",
            render_pending(&session.sequence, department, &ctx.localizer, &ctx.theme)
        );
    }
    Ok(0)
}

fn cmd_list(ctx: &CliContext) -> Result<u8> {
    let sessions = ctx.store.list()?;
    if sessions.is_empty() {
        println!("No shipments found in {}.", ctx.store.dir().display());
        return Ok(0);
    }
    println!("Shipments ({}):", sessions.len());
    for s in &sessions {
        println!(
            "  {}: {} {}  {}",
            s.shipment,
            s.direction,
            s.mode,
            lgx_state::progress(&s.sequence)
        );
    }
    Ok(0)
}

fn cmd_export(
    ctx: &CliContext,
    shipment: &ShipmentRef,
    format: ExportFormat,
    out: Option<&Path>,
) -> Result<u8> {
    let session = ctx.store.load(shipment)?;
    let snapshot = Snapshot::capture(shipment, &session.sequence, &ctx.localizer);
    let text = render(&snapshot, format)?;
    let digest = snapshot.content_digest()?;
    match out {
        Some(out) => {
            let path = export_path(out, shipment, format);
            std::fs::write(&path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "OK: exported {shipment} as {format} to {} ({digest})",
                path.display()
            );
        }
        None => {
            print!("{text}");
            tracing::info!(%shipment, %format, %digest, "snapshot exported");
        }
    }
    Ok(0)
}

/// `out` itself, or `<out>/<shipment>.<ext>` when `out` is a directory.
fn export_path(out: &Path, shipment: &ShipmentRef, format: ExportFormat) -> PathBuf {
    if out.is_dir() {
        out.join(format!("{shipment}.{}", format.extension()))
    } else {
        out.to_path_buf()
    }
}

fn cmd_retype(
    ctx: &CliContext,
    shipment: &ShipmentRef,
    direction: ShipmentDirection,
    mode: TransportMode,
    policy: ReplacePolicy,
) -> Result<u8> {
    let definitions = ctx.catalog.definitions(direction, mode)?;
    mutate(ctx, shipment, |session, tracker| {
        let outcome = tracker.replace_definitions(definitions, policy)?;
        session.direction = direction;
        session.mode = mode;
        let mut message = format!(
            "shipment {shipment} retyped to {direction} {mode} ({policy}: {} carried",
            outcome.carried
        );
        if !outcome.repaired.is_empty() {
            let ids: Vec<&str> = outcome.repaired.iter().map(MilestoneId::as_str).collect();
            message.push_str(&format!(", completion cleared on {}", ids.join(", ")));
        }
        if !outcome.dropped.is_empty() {
            message.push_str(&format!(", {} dropped", outcome.dropped.len()));
        }
        message.push(')');
        Ok(message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgx_catalog::{BuiltinCatalog, Locale};

    fn ctx(dir: &Path) -> CliContext {
        CliContext {
            store: SessionStore::new(dir.join("shipments")),
            localizer: MessageTable::builtin(Locale::En),
            theme: ThemeTokens::plain(),
            catalog: Box::new(BuiltinCatalog),
        }
    }

    fn shipment() -> ShipmentRef {
        ShipmentRef::new("SHP-1").unwrap()
    }

    fn target(milestone: &str) -> MilestoneTarget {
        MilestoneTarget {
            shipment: shipment(),
            milestone: MilestoneId::new(milestone).unwrap(),
        }
    }

    fn init(ctx: &CliContext, select_all: bool) {
        let code = run_command(
            &Commands::Init {
                shipment: shipment(),
                direction: ShipmentDirection::Import,
                mode: TransportMode::Sea,
                select_all,
                catalog: None,
            },
            ctx,
        )
        .unwrap();
        assert_eq!(code, 0);
    }

    fn load(ctx: &CliContext) -> Session {
        ctx.store.load(&shipment()).unwrap()
    }

    #[test]
    fn init_creates_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        let s = load(&ctx);
        assert_eq!(s.direction, ShipmentDirection::Import);
        assert!(s.sequence.iter().all(|m| m.selected && !m.completed));
        assert!(dir.path().join("shipments").join("SHP-1.json").is_file());
    }

    #[test]
    fn init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, false);
        let err = run_command(
            &Commands::Init {
                shipment: shipment(),
                direction: ShipmentDirection::Export,
                mode: TransportMode::Air,
                select_all: false,
                catalog: None,
            },
            &ctx,
        )
        .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn init_with_catalog_override() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        let catalog = dir.path().join("catalog.yaml");
        std::fs::write(
            &catalog,
            "templates:\n  - { direction: import, mode: sea, milestones: [{ id: a, category: operations }, { id: b, category: customs }] }\n",
        )
        .unwrap();
        let code = run_command(
            &Commands::Init {
                shipment: shipment(),
                direction: ShipmentDirection::Import,
                mode: TransportMode::Sea,
                select_all: false,
                catalog: Some(catalog),
            },
            &ctx,
        )
        .unwrap();
        assert_eq!(code, 0);
        assert_eq!(load(&ctx).sequence.len(), 2);
    }

    #[test]
    fn complete_in_order_then_reject_skip() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);

        assert_eq!(run_command(&Commands::Complete(target("order_received")), &ctx).unwrap(), 0);
        assert!(load(&ctx).sequence.get(&target("order_received").milestone).unwrap().completed);

        let before = std::fs::read_to_string(ctx.store.path_for(&shipment())).unwrap();
        let code = run_command(&Commands::Complete(target("vessel_arrival")), &ctx).unwrap();
        assert_eq!(code, EXIT_REJECTED);
        let after = std::fs::read_to_string(ctx.store.path_for(&shipment())).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn reactivate_blocked_by_later_completion() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        for m in ["order_received", "booking_confirmed"] {
            run_command(&Commands::Complete(target(m)), &ctx).unwrap();
        }
        assert_eq!(
            run_command(&Commands::Reactivate(target("order_received")), &ctx).unwrap(),
            EXIT_REJECTED
        );
        assert_eq!(
            run_command(&Commands::Reactivate(target("booking_confirmed")), &ctx).unwrap(),
            0
        );
    }

    #[test]
    fn idempotent_complete_does_not_rewrite_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        run_command(&Commands::Complete(target("order_received")), &ctx).unwrap();
        let before = load(&ctx);
        run_command(&Commands::Complete(target("order_received")), &ctx).unwrap();
        let after = load(&ctx);
        assert_eq!(before.updated_at, after.updated_at);
        assert_eq!(before.transition_log.len(), after.transition_log.len());
    }

    #[test]
    fn unknown_milestone_is_an_error_not_a_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        let err = run_command(&Commands::Complete(target("teleport")), &ctx).unwrap_err();
        assert!(format!("{err:#}").contains("milestone not found: teleport"));
    }

    #[test]
    fn missing_session_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        assert!(run_command(&Commands::Status { shipment: shipment() }, &ctx).is_err());
    }

    #[test]
    fn date_is_validated_and_normalised() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        let date = |value: &str| Commands::Date {
            target: target("order_received"),
            value: Some(value.to_string()),
            clear: false,
        };
        assert!(run_command(&date("2024-02-30"), &ctx).is_err());
        assert_eq!(run_command(&date("2024-02-29"), &ctx).unwrap(), 0);
        let s = load(&ctx);
        let m = s.sequence.get(&target("order_received").milestone).unwrap();
        assert_eq!(m.date.as_deref(), Some("2024-02-29"));

        let clear = Commands::Date {
            target: target("order_received"),
            value: None,
            clear: true,
        };
        assert_eq!(run_command(&clear, &ctx).unwrap(), 0);
        assert!(load(&ctx).sequence.get(&target("order_received").milestone).unwrap().date.is_none());
    }

    #[test]
    fn details_on_blocked_milestone_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        let cmd = Commands::Details {
            target: target("vessel_arrival"),
            text: Some("ETA moved".into()),
            clear: false,
        };
        assert_eq!(run_command(&cmd, &ctx).unwrap(), EXIT_REJECTED);
    }

    #[test]
    fn assign_and_unassign() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, false);
        let assign = |agent: Option<&str>| Commands::Assign {
            target: target("customs_clearance"),
            agent: agent.map(String::from),
        };
        run_command(&assign(Some("Dana Ortiz")), &ctx).unwrap();
        let id = target("customs_clearance").milestone;
        assert_eq!(load(&ctx).sequence.get(&id).unwrap().agent_name.as_deref(), Some("Dana Ortiz"));
        run_command(&assign(None), &ctx).unwrap();
        assert!(load(&ctx).sequence.get(&id).unwrap().agent_name.is_none());
    }

    #[test]
    fn select_toggles_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, false);
        run_command(&Commands::Select(target("duties_paid")), &ctx).unwrap();
        let s = load(&ctx);
        assert!(s.sequence.get(&target("duties_paid").milestone).unwrap().selected);
        assert_eq!(s.transition_log.len(), 1);
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        run_command(&Commands::Complete(target("order_received")), &ctx).unwrap();
        let out = dir.path().join("snap.csv");
        let code = run_command(
            &Commands::Export {
                shipment: shipment(),
                format: ExportFormat::Csv,
                out: Some(out.clone()),
            },
            &ctx,
        )
        .unwrap();
        assert_eq!(code, 0);
        let text = std::fs::read_to_string(out).unwrap();
        assert!(text.starts_with("position,id,name"));
        assert!(text.contains("order_received,Order received"));
    }

    #[test]
    fn export_into_directory_names_file_after_shipment() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        let out_dir = dir.path().join("exports");
        std::fs::create_dir(&out_dir).unwrap();
        let code = run_command(
            &Commands::Export {
                shipment: shipment(),
                format: ExportFormat::Yaml,
                out: Some(out_dir.clone()),
            },
            &ctx,
        )
        .unwrap();
        assert_eq!(code, 0);
        let text = std::fs::read_to_string(out_dir.join("SHP-1.yaml")).unwrap();
        assert!(text.contains("shipment: SHP-1"));
    }

    #[test]
    fn blank_agent_clears_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        let assign = |agent: &str| Commands::Assign {
            target: target("duties_paid"),
            agent: Some(agent.to_string()),
        };
        assert_eq!(run_command(&assign("Ana Ruiz"), &ctx).unwrap(), 0);
        assert_eq!(run_command(&assign("  "), &ctx).unwrap(), 0);
        let id = target("duties_paid").milestone;
        assert!(load(&ctx).sequence.get(&id).unwrap().agent_name.is_none());
    }

    #[test]
    fn retype_reconciles_and_updates_header() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        init(&ctx, true);
        for m in ["order_received", "booking_confirmed"] {
            run_command(&Commands::Complete(target(m)), &ctx).unwrap();
        }
        let code = run_command(
            &Commands::Retype {
                shipment: shipment(),
                direction: ShipmentDirection::Import,
                mode: TransportMode::Air,
                policy: ReplacePolicy::Reconcile,
            },
            &ctx,
        )
        .unwrap();
        assert_eq!(code, 0);
        let s = load(&ctx);
        assert_eq!(s.mode, TransportMode::Air);
        assert!(s.sequence.get(&target("booking_confirmed").milestone).unwrap().completed);
        assert!(s.sequence.get(&target("vessel_departure").milestone).is_none());
        s.sequence.check_prefix_closed().unwrap();
    }

    #[test]
    fn read_only_commands_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        assert_eq!(run_command(&Commands::List, &ctx).unwrap(), 0);
        init(&ctx, true);
        assert_eq!(run_command(&Commands::Status { shipment: shipment() }, &ctx).unwrap(), 0);
        for department in [None, Some(Department::Customs)] {
            let progress = Commands::Progress {
                shipment: shipment(),
                department,
            };
            assert_eq!(run_command(&progress, &ctx).unwrap(), 0);
        }
        assert_eq!(run_command(&Commands::List, &ctx).unwrap(), 0);
    }
}

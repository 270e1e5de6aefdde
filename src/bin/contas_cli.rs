use std::{
    env,
    path::{Path, PathBuf},
    process,
};

use chrono::{Datelike, Local, NaiveDate};

use contas_core::{
    cli::output::{self, OutputPreferences},
    config::ConfigManager,
    core::services::{
        BillEdit, BillFilter, BuiltinFilter, CategoryService, ChartPeriod, SummaryService,
    },
    domain::{Bill, BillStatus, Displayable},
    init,
    transfer::{self, default_backup_file_name, default_category_file_name},
    utils::format::{format_amount, format_date, parse_amount, parse_date},
    FlushTrigger, Tracker,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    init();
    output::set_preferences(OutputPreferences {
        plain: env::var_os("NO_COLOR").is_some() || env::var_os("CONTAS_CORE_PLAIN").is_some(),
        quiet: env::var_os("CONTAS_CORE_QUIET").is_some(),
    });

    if let Err(err) = run() {
        output::error(err);
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        process::exit(1);
    };

    if command == "version" {
        print_version();
        return Ok(());
    }

    let manager = ConfigManager::new()?;
    let mut tracker = Tracker::open_configured(&manager)?;
    for warning in tracker.load_warnings() {
        output::warning(warning);
    }
    if tracker.is_first_run() {
        output::info("First start: sample bills and categories were created.");
    }

    let today = Local::now().date_naive();
    match command.as_str() {
        "status" => print_status(&tracker),
        "list" => list_bills(&tracker, rest, today)?,
        "add" => {
            let [category, amount, date, extra @ ..] = rest else {
                return usage_error("add <category> <amount> <date> [Pago|Pendente]");
            };
            let status = match extra.first() {
                Some(raw) => parse_status(raw)?,
                None => BillStatus::Pending,
            };
            let bill = Bill::new(category.as_str(), amount_arg(amount)?, date_arg(date)?, status);
            let index = tracker.add_bill(bill)?;
            output::success(format!("Bill #{} added.", index + 1));
        }
        "edit" => {
            let [index, field, value] = rest else {
                return usage_error("edit <n> <categoria|valor|data|status> <value>");
            };
            let edit = match field.as_str() {
                "categoria" | "category" => BillEdit::Category(value.clone()),
                "valor" | "amount" => BillEdit::Amount(amount_arg(value)?),
                "data" | "date" => BillEdit::DueDate(date_arg(value)?),
                "status" => BillEdit::Status(parse_status(value)?),
                other => return Err(format!("unknown field `{other}`").into()),
            };
            tracker.edit_bill(position_arg(index)?, edit)?;
            output::success("Bill updated.");
        }
        "toggle" => {
            let [index] = rest else {
                return usage_error("toggle <n>");
            };
            let status = tracker.toggle_bill_status(position_arg(index)?)?;
            output::success(format!("Bill marked as {status}."));
        }
        "remove" => {
            let [index] = rest else {
                return usage_error("remove <n>");
            };
            let bill = tracker.remove_bill(position_arg(index)?)?;
            output::success(format!("Removed {}.", bill.display_label()));
        }
        "categories" => list_categories(&tracker),
        "builtins" => {
            let filter = match rest.first().map(String::as_str) {
                None | Some("all") => BuiltinFilter::All,
                Some("active") => BuiltinFilter::Active,
                Some("hidden") => BuiltinFilter::Hidden,
                Some("in-use") => BuiltinFilter::InUse,
                Some(other) => return Err(format!("unknown filter `{other}`").into()),
            };
            for status in CategoryService::builtin_overview(tracker.model(), filter) {
                let state = if status.hidden { "hidden" } else { "active" };
                println!("{:<12} {:<7} {} bill(s)", status.name, state, status.bills);
            }
        }
        "create" => {
            let [name, extra @ ..] = rest else {
                return usage_error("create <name> [kind]");
            };
            let index = tracker.create_category(name, extra.first().map(String::as_str))?;
            let created = &tracker.model().categories[index];
            output::success(format!("Category \"{}\" created.", created.name));
        }
        "rename" => {
            let [index, name] = rest else {
                return usage_error("rename <n> <new name>");
            };
            let report = tracker.rename_category(position_arg(index)?, name)?;
            output::success(format!(
                "\"{}\" renamed to \"{}\"; {} bill(s) updated.",
                report.old_name, report.new_name, report.cascaded
            ));
        }
        "delete" => {
            let (index, confirmed) = match rest {
                [index] => (index, false),
                [index, flag] if flag == "--yes" => (index, true),
                _ => return usage_error("delete <n> [--yes]"),
            };
            let index = position_arg(index)?;
            if let Some(category) = tracker.model().category(index) {
                let in_use = tracker.model().bills_referencing(&category.name);
                if in_use > 0 && !confirmed {
                    return Err(format!(
                        "category \"{}\" is used by {} bill(s); pass --yes to delete them too",
                        category.name, in_use
                    )
                    .into());
                }
            }
            let report = tracker.delete_category(index)?;
            output::success(format!(
                "Category \"{}\" deleted with {} bill(s).",
                report.name, report.bills_removed
            ));
        }
        "hide" => {
            let [name] = rest else {
                return usage_error("hide <built-in>");
            };
            let report = tracker.hide_category(name)?;
            if report.changed {
                output::success(format!("\"{name}\" hidden."));
            } else {
                output::info(format!("\"{name}\" was already hidden."));
            }
            if report.bills_referencing > 0 {
                output::warning(format!(
                    "{} bill(s) still use \"{name}\".",
                    report.bills_referencing
                ));
            }
        }
        "show" => {
            let [name] = rest else {
                return usage_error("show <built-in>");
            };
            if tracker.show_category(name)? {
                output::success(format!("\"{name}\" is visible again."));
            } else {
                output::info(format!("\"{name}\" was not hidden."));
            }
        }
        "remove-builtin" => {
            let [name] = rest else {
                return usage_error("remove-builtin <built-in>");
            };
            tracker.remove_builtin(name)?;
            output::success(format!("\"{name}\" removed."));
        }
        "hide-all" => {
            let count = tracker.hide_all_categories()?;
            output::success(format!("{count} built-in categories hidden."));
        }
        "show-all" => {
            let count = tracker.show_all_categories()?;
            output::success(format!("{count} built-in categories shown."));
        }
        "restore" => {
            tracker.restore_default_categories()?;
            output::success("Built-in categories restored.");
        }
        "summary" => {
            let period = match rest.first().map(String::as_str) {
                None | Some("mes") | Some("month") => ChartPeriod::Month,
                Some("ano") | Some("year") => ChartPeriod::Year,
                Some("todos") | Some("all") => ChartPeriod::All,
                Some(other) => return Err(format!("unknown period `{other}`").into()),
            };
            print_summary(&tracker, period, today);
        }
        "calendar" => {
            let month = rest
                .first()
                .cloned()
                .unwrap_or_else(|| today.format("%Y-%m").to_string());
            print_calendar(&tracker, &month)?;
        }
        "export-categories" => {
            let document = tracker.export_categories();
            let path = path_or_default(rest, default_category_file_name(today));
            transfer::write_document(&path, &document)?;
            output::success(format!(
                "{} categories exported to {}.",
                document.total,
                path.display()
            ));
        }
        "import-categories" => {
            let [path] = rest else {
                return usage_error("import-categories <file>");
            };
            let text = transfer::read_document(Path::new(path))?;
            let summary = tracker.import_categories(&text)?;
            for warning in &summary.warnings {
                output::warning(warning);
            }
            output::success(format!(
                "{} categories imported, {} skipped.",
                summary.imported,
                summary.skipped.len()
            ));
        }
        "export-backup" => {
            let document = tracker.export_backup();
            let path = path_or_default(rest, default_backup_file_name(today));
            transfer::write_document(&path, &document)?;
            output::success(format!(
                "Backup with {} bill(s) exported to {}.",
                document.total_bills,
                path.display()
            ));
        }
        "import-backup" => {
            let [path] = rest else {
                return usage_error("import-backup <file>");
            };
            let text = transfer::read_document(Path::new(path))?;
            for warning in tracker.import_backup(&text)? {
                output::warning(warning);
            }
            output::success(format!(
                "Backup imported: {} bill(s), {} categories.",
                tracker.model().bills.len(),
                tracker.model().categories.len()
            ));
        }
        "theme" => {
            let dark = match rest.first().map(String::as_str) {
                None => tracker.toggle_theme()?,
                Some("dark") => {
                    tracker.set_dark_mode(true)?;
                    true
                }
                Some("light") => {
                    tracker.set_dark_mode(false)?;
                    false
                }
                Some(other) => return Err(format!("unknown theme `{other}`").into()),
            };
            output::success(format!("Theme: {}.", if dark { "dark" } else { "light" }));
        }
        "prune" => {
            let removed = tracker.prune_storage()?;
            output::success(format!("{removed} non-essential key(s) removed."));
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }

    if let Some(outcome) = tracker.flush(FlushTrigger::Teardown)? {
        if outcome.is_degraded() {
            output::warning("Storage is full: only the most recent bills were kept.");
        }
    }
    Ok(())
}

fn print_status(tracker: &Tracker) {
    let status = tracker.status();
    output::section("Storage");
    println!("Bills: {}", status.total_bills);
    println!("Categories: {}", status.total_categories);
    match status.last_saved {
        Some(at) => println!("Last saved: {}", at.to_rfc3339()),
        None => println!("Last saved: never"),
    }
    println!("Loaded from: {:?}", tracker.load_source());
}

fn list_bills(tracker: &Tracker, args: &[String], today: NaiveDate) -> CliResult<()> {
    let mut filter = BillFilter::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("missing value for `{flag}`"))?;
        match flag.as_str() {
            "--month" => filter.month = Some(value.clone()),
            "--category" => filter.category = Some(value.clone()),
            "--status" => filter.status = Some(parse_status(value)?),
            other => return Err(format!("unknown flag `{other}`").into()),
        }
    }

    let model = tracker.model();
    let due_soon = tracker.config().due_soon_days;
    for (index, bill) in model.bills.iter().enumerate() {
        if !filter.matches(bill) {
            continue;
        }
        let state = SummaryService::due_state_within(bill, today, due_soon);
        let marker = if state.needs_attention() { "!" } else { " " };
        println!("{marker}#{:<4} {}", index + 1, bill.display_label());
    }

    let totals = SummaryService::totals_within(model, &filter, today, due_soon);
    output::section("Totals");
    println!("Total: {}", format_amount(totals.total));
    println!("Paid: {}", format_amount(totals.paid));
    println!("Pending: {}", format_amount(totals.pending));
    if totals.alerts > 0 {
        output::warning(format!("{} bill(s) overdue or due soon.", totals.alerts));
    }
    Ok(())
}

fn list_categories(tracker: &Tracker) {
    let model = tracker.model();
    output::section("Categories");
    for (index, (category, bills)) in CategoryService::usage(model).into_iter().enumerate() {
        println!("#{:<3} {} - {} bill(s)", index + 1, category.display_label(), bills);
    }
    let stats = CategoryService::stats(model);
    println!(
        "{} total, {} built-ins visible, {} hidden, {} in use",
        stats.total, stats.visible_builtins, stats.hidden_builtins, stats.builtins_in_use
    );
    output::section("Menu");
    println!("{}", CategoryService::menu_categories(model).join(", "));
}

fn print_summary(tracker: &Tracker, period: ChartPeriod, today: NaiveDate) {
    let model = tracker.model();
    output::section("By category");
    for entry in SummaryService::category_breakdown(model, period, today) {
        println!("{:<16} {}", entry.category, format_amount(entry.amount));
    }
    output::section("Monthly evolution");
    for month in SummaryService::monthly_evolution(model) {
        println!(
            "{}  total {}  paid {}  pending {}",
            month.label,
            format_amount(month.total),
            format_amount(month.paid),
            format_amount(month.pending)
        );
    }
}

fn print_calendar(tracker: &Tracker, month: &str) -> CliResult<()> {
    let first = parse_date(&format!("{month}-01"))
        .ok_or_else(|| format!("invalid month `{month}`, expected YYYY-MM"))?;
    let calendar = SummaryService::calendar(tracker.model(), first.year(), first.month())
        .ok_or_else(|| format!("invalid month `{month}`"))?;
    for day in calendar.days.iter().filter(|day| !day.bills.is_empty()) {
        println!("{}", format_date(day.date));
        for &index in &day.bills {
            let bill = &tracker.model().bills[index];
            println!("  {}: {}", bill.category, format_amount(bill.amount));
        }
    }
    Ok(())
}

fn parse_status(raw: &str) -> CliResult<BillStatus> {
    BillStatus::parse(raw).ok_or_else(|| format!("unknown status `{raw}`").into())
}

fn amount_arg(raw: &str) -> CliResult<f64> {
    parse_amount(raw).ok_or_else(|| format!("invalid amount `{raw}`").into())
}

fn date_arg(raw: &str) -> CliResult<NaiveDate> {
    parse_date(raw).ok_or_else(|| format!("invalid date `{raw}`").into())
}

/// One-based positions on the command line.
fn position_arg(raw: &str) -> CliResult<usize> {
    match raw.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position - 1),
        _ => Err(format!("invalid position `{raw}`").into()),
    }
}

fn path_or_default(args: &[String], default_name: String) -> PathBuf {
    args.first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_name))
}

fn usage_error<T>(usage: &str) -> CliResult<T> {
    Err(format!("usage: contas_cli {usage}").into())
}

fn print_version() {
    println!(
        "contas_cli {} ({} {} built {})",
        env!("CARGO_PKG_VERSION"),
        env!("CONTAS_CORE_BUILD_HASH"),
        env!("CONTAS_CORE_BUILD_PROFILE"),
        env!("CONTAS_CORE_BUILD_TIMESTAMP")
    );
}

fn print_usage() {
    eprintln!(
        "Usage: contas_cli <command>\n\
         Bills:\n  \
         list [--month YYYY-MM] [--category NAME] [--status Pago|Pendente]\n  \
         add <category> <amount> <date> [status]\n  \
         edit <n> <categoria|valor|data|status> <value>\n  \
         toggle <n>\n  \
         remove <n>\n\
         Categories:\n  \
         categories | builtins [all|active|hidden|in-use]\n  \
         create <name> [kind] | rename <n> <name> | delete <n> [--yes]\n  \
         hide <name> | show <name> | remove-builtin <name>\n  \
         hide-all | show-all | restore\n\
         Reports:\n  \
         status | summary [mes|ano|todos] | calendar [YYYY-MM]\n\
         Documents:\n  \
         export-categories [file] | import-categories <file>\n  \
         export-backup [file] | import-backup <file>\n\
         Other:\n  \
         theme [dark|light] | prune | version"
    );
}

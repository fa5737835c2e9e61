//! PoochPulse command-line host.
//!
//! **Usage:**
//! ```bash
//! pooch-pulse analyze photo.jpg
//! pooch-pulse reports list
//! pooch-pulse dogs add --name 豆豆 --breed 柯基 --weight 9
//! pooch-pulse calendar --month 2025-03
//! ```
//!
//! Provider settings come from the environment (a `.env` file is loaded first),
//! see `ProviderConfig::from_env`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use pooch_pulse_core::models::{DogDraft, DogProfile, HealthReport};
use pooch_pulse_core::views::{self, MonthCursor};
use pooch_pulse_core::{AnalysisClient, AnalysisError, Database, ImageData, Journal, JournalError};
use pooch_pulse_llm::ProviderConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Dog stool-health journal
#[derive(Parser, Debug)]
#[command(name = "pooch-pulse", version)]
#[command(about = "Photograph, analyse and track your dog's stool health")]
struct Cli {
    /// Journal database file
    #[arg(long, env = "POOCH_PULSE_DB", default_value = "pooch-pulse.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a photo for the active dog and record the report
    Analyze {
        /// JPEG, PNG, GIF or WebP file
        image: PathBuf,
    },
    /// Browse and delete reports of the active dog
    #[command(subcommand)]
    Reports(ReportsCommand),
    /// Manage dog profiles
    #[command(subcommand)]
    Dogs(DogsCommand),
    /// Month grid with report counts, or one day's reports
    Calendar {
        /// Month to show, YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<MonthCursor>,
        /// List reports on this date, YYYY-MM-DD
        #[arg(long)]
        day: Option<NaiveDate>,
    },
    /// Score trend, oldest first
    Trend,
    /// Provider proxy address
    #[command(subcommand)]
    Proxy(ProxyCommand),
    /// Stool-health tips
    Tips,
}

#[derive(Subcommand, Debug)]
enum ReportsCommand {
    List,
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum DogsCommand {
    List,
    /// Add a dog and make it active
    Add(DogArgs),
    Update {
        id: String,
        #[command(flatten)]
        dog: DogArgs,
    },
    Select { id: String },
}

#[derive(Args, Debug)]
struct DogArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    breed: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    birth_date: Option<String>,
    /// Kilograms
    #[arg(long)]
    weight: Option<String>,
    /// Photo file used as the avatar
    #[arg(long)]
    avatar: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ProxyCommand {
    Show,
    Set { url: String },
    Clear,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pooch_pulse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db)
        .with_context(|| format!("Failed to open journal at {}", cli.db.display()))?;
    let mut journal = Journal::open(db);

    match cli.command {
        Command::Analyze { image } => analyze(&mut journal, &image),
        Command::Reports(cmd) => reports(&mut journal, cmd),
        Command::Dogs(cmd) => dogs(&mut journal, cmd),
        Command::Calendar { month, day } => {
            calendar(&journal, month, day);
            Ok(())
        }
        Command::Trend => {
            trend(&journal);
            Ok(())
        }
        Command::Proxy(cmd) => proxy(&mut journal, cmd),
        Command::Tips => {
            tips();
            Ok(())
        }
    }
}

fn analyze(journal: &mut Journal, path: &Path) -> Result<()> {
    let config = ProviderConfig::from_env()?;
    tracing::debug!(?config, "Provider configuration loaded");
    let client = AnalysisClient::new(&config)?;
    let image = ImageData::from_file(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;

    let report = match journal.submit(&client, &image) {
        Ok(report) => report,
        Err(JournalError::Analysis(e)) => {
            if matches!(e, AnalysisError::ApiKeyMissing) {
                eprintln!("Set GEMINI_API_KEY or DEEPSEEK_API_KEY (see POOCH_PROVIDER).");
            }
            bail!(e.user_message());
        }
        Err(e) => return Err(e.into()),
    };

    let dog = journal.active_dog();
    let summary = views::daily_summary(&report, &dog.name, &Local);
    println!("今日健康快报 · {} 的最新分析已完成", summary.dog_name);
    println!("{} · {}", summary.headline, summary.consistency);
    println!("分析时间：{}", summary.analysed_at);
    println!();
    print_detail(&report);
    Ok(())
}

fn reports(journal: &mut Journal, cmd: ReportsCommand) -> Result<()> {
    match cmd {
        ReportsCommand::List => {
            let reports = journal.active_reports();
            if reports.is_empty() {
                println!("还没有记录");
            }
            for report in reports {
                print_row(report);
            }
        }
        ReportsCommand::Show { id } => {
            let report = journal
                .state()
                .reports
                .get(&id)
                .ok_or_else(|| anyhow!("No report with id {}", id))?;
            print_detail(report);
        }
        ReportsCommand::Delete { id } => {
            if !journal.delete_report(&id)? {
                bail!("No report with id {}", id);
            }
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

fn dogs(journal: &mut Journal, cmd: DogsCommand) -> Result<()> {
    match cmd {
        DogsCommand::List => {
            let active = journal.active_dog().id.clone();
            for dog in journal.state().dogs.all() {
                let marker = if dog.id == active { "*" } else { " " };
                print_dog(marker, dog);
            }
        }
        DogsCommand::Add(args) => {
            let dog = journal.add_dog(args.into_draft()?)?;
            print_dog("*", &dog);
        }
        DogsCommand::Update { id, dog } => {
            let dog = journal.update_dog(&id, dog.into_draft()?)?;
            print_dog(" ", &dog);
        }
        DogsCommand::Select { id } => {
            journal.select_dog(&id)?;
            print_dog("*", journal.active_dog());
        }
    }
    Ok(())
}

impl DogArgs {
    fn into_draft(self) -> Result<DogDraft> {
        let custom_avatar_url = match &self.avatar {
            Some(path) => Some(
                ImageData::from_file(path)
                    .with_context(|| format!("Failed to read avatar {}", path.display()))?
                    .to_data_uri(),
            ),
            None => None,
        };
        Ok(DogDraft {
            name: self.name,
            breed: self.breed,
            birth_date: self.birth_date,
            weight: self.weight,
            custom_avatar_url,
        })
    }
}

fn calendar(journal: &Journal, month: Option<MonthCursor>, day: Option<NaiveDate>) {
    let reports = journal.active_reports();

    if let Some(day) = day {
        let on_day = views::reports_on(&reports, day);
        println!("{} ({} 条)", views::day_heading(day), on_day.len());
        if on_day.is_empty() {
            println!("这天没有记录哦");
        }
        for report in on_day {
            print_row(report);
        }
        return;
    }

    let today = Utc::now().date_naive();
    let cursor = month.unwrap_or_else(|| MonthCursor::containing(today));
    let view = views::month_view(&reports, cursor, today);

    println!("{}", view.label);
    println!(" 日  一  二  三  四  五  六");
    let mut line = "    ".repeat(view.leading_blanks as usize);
    for (i, day) in view.days.iter().enumerate() {
        let mark = match (day.is_today, day.report_count) {
            (true, _) => '<',
            (false, 0) => ' ',
            (false, _) => '•',
        };
        line.push_str(&format!("{:>2}{} ", day.day, mark));
        if (view.leading_blanks as usize + i + 1) % 7 == 0 {
            println!("{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        println!("{}", line.trim_end());
    }
}

fn trend(journal: &Journal) {
    let series = views::trend(&journal.active_reports(), &Local);
    println!("健康趋势 ({}-{} 分)", series.y_min, series.y_max);
    if series.is_empty() {
        println!("还没有记录");
        return;
    }
    for point in &series.points {
        let band = if series.in_band(point.score) { "✓" } else { " " };
        let bar = "█".repeat(point.score as usize);
        println!("{:>7} {} {:<7} {}", point.label, band, bar, point.score);
    }
}

fn proxy(journal: &mut Journal, cmd: ProxyCommand) -> Result<()> {
    match cmd {
        ProxyCommand::Show => match journal.proxy_url() {
            Some(url) => println!("{}", url),
            None => println!("(provider default)"),
        },
        ProxyCommand::Set { url } => {
            journal.set_proxy_url(Some(&url))?;
            println!("Proxy set to {}", journal.proxy_url().unwrap_or("(provider default)"));
        }
        ProxyCommand::Clear => {
            journal.set_proxy_url(None)?;
            println!("Proxy cleared");
        }
    }
    Ok(())
}

fn tips() {
    println!("犬类便便科普");
    for item in views::knowledge_items() {
        println!();
        println!("{} {}", item.icon, item.title);
        println!("   {}", item.description);
    }
    println!();
    println!("小贴士：{}", views::KNOWLEDGE_TIP);
}

fn print_row(report: &HealthReport) {
    let time = report
        .timestamp()
        .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| report.date.clone());
    println!(
        "{}  {}  {}/7  {}",
        report.id, time, report.score, report.consistency
    );
}

fn print_detail(report: &HealthReport) {
    let detail = views::report_detail(report);
    println!("分值: {}  {} [{}]", detail.score, detail.severity_label, detail.badge.as_str());
    println!("颜色: {}", detail.color);
    println!("质地: {}", detail.consistency);
    println!("AI 分析: {}", detail.analysis);
    if !detail.findings.is_empty() {
        println!("显著发现:");
        for (i, finding) in detail.findings.iter().enumerate() {
            println!("  {}. {}", i + 1, finding);
        }
    }
    println!("健康建议: {}", detail.recommendation);
    println!();
    println!("免责声明：{}", detail.disclaimer);
}

fn print_dog(marker: &str, dog: &DogProfile) {
    println!(
        "{} {}  {} · {} · {}",
        marker,
        dog.id,
        dog.name,
        dog.breed,
        dog.weight_label()
    );
}

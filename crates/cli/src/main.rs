//! Command Line Interface for the hashrate-versus-hold calculator.
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use minesim_domain::config::{AssetSeriesConfig, SimulationConfig};
use minesim_domain::mining::MiningEconomicsParameters;
use minesim_domain::value_objects::simulation_report::SimulationReport;
use minesim_domain::value_objects::statistics::StrategyStatistics;
use minesim_simulation::economics::yearly_production;
use minesim_simulation::monte_carlo::MonteCarloRunner;
use prettytable::{Table, row};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "minesim")]
#[command(
    about = "Monte Carlo comparison of holding BTC versus funding a mining operation",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Monte Carlo comparison
    Run {
        #[command(flatten)]
        inputs: Inputs,

        /// Number of simulated paths
        #[arg(long)]
        paths: Option<usize>,

        /// Correlation between BTC and the reference series
        #[arg(long, allow_hyphen_values = true)]
        correlation: Option<f64>,

        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full report as JSON instead of tables
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the yearly mining production schedule
    Schedule {
        #[command(flatten)]
        inputs: Inputs,
    },
}

/// Inputs shared by every subcommand. Flags override values from `--config`.
#[derive(Args)]
struct Inputs {
    /// JSON file holding a full simulation config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Horizon in years
    #[arg(short, long)]
    years: Option<u32>,

    /// Capital invested
    #[arg(long)]
    capital: Option<Decimal>,

    /// BTC price today
    #[arg(long)]
    btc_price: Option<Decimal>,

    /// Median BTC price expected at the horizon
    #[arg(long)]
    btc_target: Option<Decimal>,

    /// Annualized BTC volatility
    #[arg(long)]
    btc_vol: Option<f64>,

    /// Reference series price today
    #[arg(long)]
    ref_price: Option<Decimal>,

    /// Median reference series price expected at the horizon
    #[arg(long)]
    ref_target: Option<Decimal>,

    /// Annualized reference series volatility
    #[arg(long)]
    ref_vol: Option<f64>,

    /// Hashrate owned by the operation (TH/s)
    #[arg(long)]
    hashrate: Option<f64>,

    /// Network hashrate (TH/s)
    #[arg(long)]
    network_hashrate: Option<f64>,

    /// Annual difficulty growth (0.3 = 30%)
    #[arg(long)]
    difficulty_growth: Option<f64>,

    /// Fleet uptime fraction
    #[arg(long)]
    uptime: Option<f64>,

    /// Total capital expenditure
    #[arg(long)]
    capex: Option<Decimal>,

    /// Total operating expenditure per year
    #[arg(long)]
    opex: Option<Decimal>,

    /// Investor share of mined BTC
    #[arg(long)]
    profit_share: Option<f64>,

    /// Equipment residual value as a fraction of CAPEX
    #[arg(long)]
    residual: Option<f64>,

    /// Calendar year of the first simulated year
    #[arg(long)]
    start_year: Option<u32>,
}

impl Inputs {
    fn into_config(self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => default_config(),
        };

        if let Some(years) = self.years {
            config.horizon_years = years;
        }
        if let Some(capital) = self.capital {
            config.invested_capital = capital;
        }
        override_series(&mut config.primary, self.btc_price, self.btc_target, self.btc_vol);
        override_series(&mut config.secondary, self.ref_price, self.ref_target, self.ref_vol);

        let mining = &mut config.mining;
        set(&mut mining.owned_hashrate, self.hashrate);
        set(&mut mining.network_hashrate, self.network_hashrate);
        set(&mut mining.difficulty_growth, self.difficulty_growth);
        set(&mut mining.uptime, self.uptime);
        set(&mut mining.total_capex, self.capex);
        set(&mut mining.annual_opex, self.opex);
        set(&mut mining.profit_share, self.profit_share);
        set(&mut mining.residual_value, self.residual);
        set(&mut mining.start_year, self.start_year);

        Ok(config)
    }
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn override_series(
    series: &mut AssetSeriesConfig,
    price: Option<Decimal>,
    target: Option<Decimal>,
    volatility: Option<f64>,
) {
    set(&mut series.start_price, price);
    set(&mut series.target_price, target);
    set(&mut series.volatility, volatility);
}

fn default_config() -> SimulationConfig {
    SimulationConfig::new(
        5,
        AssetSeriesConfig::new("BTC", Decimal::from(100_000), Decimal::from(200_000), 0.55),
        AssetSeriesConfig::new("SPX", Decimal::from(6_000), Decimal::from(7_500), 0.18),
        Decimal::from(100_000),
    )
    .with_correlation(0.3)
    .with_mining(
        // 20 PH/s against an 800 EH/s network.
        MiningEconomicsParameters::new(
            20_000.0,
            800_000_000.0,
            Decimal::from(400_000),
            Decimal::from(60_000),
        )
        .with_difficulty_growth(0.3)
        .with_uptime(0.95)
        .with_profit_share(0.7)
        .with_residual_value(0.1),
    )
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            inputs,
            paths,
            correlation,
            seed,
            json,
        } => {
            let mut config = inputs.into_config()?;
            set(&mut config.paths, paths);
            set(&mut config.correlation, correlation);
            if seed.is_some() {
                config.seed = seed;
            }

            let runner = MonteCarloRunner::new(config).context("invalid simulation config")?;
            let report = runner.run()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(runner.config(), &report);
            }
        }
        Commands::Schedule { inputs } => {
            let config = inputs.into_config()?;
            config.mining.validate().context("invalid mining parameters")?;
            if !config.mining.is_configured() {
                bail!(
                    "mining operation not configured: \
                     set --hashrate, --network-hashrate and --capex above 0"
                );
            }
            info!(years = config.horizon_years, "Computing mining schedule");
            let rows = yearly_production(&config.mining, config.horizon_years)
                .context("mining parameters do not define a schedule")?;

            let mut table = Table::new();
            table.add_row(row![
                "Year",
                "Calendar",
                "Difficulty x",
                "Network share",
                "Reward",
                "BTC mined"
            ]);
            let mut total = 0.0;
            for r in &rows {
                total += r.btc_mined;
                table.add_row(row![
                    r.year,
                    r.calendar_year,
                    format!("{:.3}", r.difficulty_factor),
                    format!("{:.6}%", r.network_share * 100.0),
                    format!("{:.4}", r.block_reward),
                    format!("{:.6}", r.btc_mined)
                ]);
            }
            table.printstd();
            println!("Total BTC mined:   {:.6}", total);
            println!("Investor share:    {:.6}", total * config.mining.profit_share);
        }
    }

    Ok(())
}

fn print_report(config: &SimulationConfig, report: &SimulationReport) {
    let stats = &report.statistics;

    println!(
        "\n📊 Monte Carlo Results ({} paths, {} years, seed {})",
        stats.paths, config.horizon_years, report.seed
    );
    println!("{}", "═".repeat(36));
    println!("Invested capital:  ${:.2}", config.invested_capital);
    println!(
        "{} drift:         {:.4} (median target ${:.2})",
        config.primary.name, report.primary_drift, config.primary.target_price
    );
    if let Some(rho) = report.realized_correlation {
        println!("Shock correlation: {:.3} (configured {:.3})", rho, config.correlation);
    }
    println!("{}", "═".repeat(36));

    let mut table = Table::new();
    table.add_row(row!["ROI %", "Buy & hold", "Mining"]);
    let line = |label: &str, f: fn(&StrategyStatistics) -> f64| {
        row![label, format!("{:.2}", f(&stats.buy)), format!("{:.2}", f(&stats.mine))]
    };
    table.add_row(line("P10", |s| s.percentiles.p10));
    table.add_row(line("P25", |s| s.percentiles.p25));
    table.add_row(line("Median", |s| s.percentiles.p50));
    table.add_row(line("P75", |s| s.percentiles.p75));
    table.add_row(line("P90", |s| s.percentiles.p90));
    table.add_row(line("Mean", |s| s.mean));
    table.add_row(line("Std dev", |s| s.std_dev));
    table.add_row(line("Min", |s| s.min));
    table.add_row(line("Max", |s| s.max));
    table.add_row(line("ES (10%)", |s| s.expected_shortfall_10));
    table.add_row(line("P(loss) %", |s| s.downside_probability * 100.0));
    table.printstd();

    println!("Mining wins:       {:.1}% of paths", stats.mine_win_rate * 100.0);
    println!("Holding wins:      {:.1}% of paths", stats.buy_win_rate * 100.0);
    println!("Mean advantage:    {:+.2} pts (mining - holding)", stats.mean_mining_advantage);

    for summary in [&report.primary_terminal, &report.secondary_terminal] {
        println!(
            "{} terminal price: P10 {:.2} | median {:.2} | P90 {:.2} | mean {:.2}",
            summary.series,
            summary.percentiles.p10,
            summary.percentiles.p50,
            summary.percentiles.p90,
            summary.mean
        );
    }

    if !report.samples.is_empty() {
        let mut samples = Table::new();
        samples.add_row(row!["Path", "Terminal price", "Buy ROI %", "Mine ROI %", "Advantage"]);
        for sample in &report.samples {
            samples.add_row(row![
                sample.index,
                format!("{:.2}", sample.primary.terminal()),
                format!("{:.2}", sample.outcome.buy_roi_pct),
                format!("{:.2}", sample.outcome.mine_roi_pct),
                format!("{:+.2}", sample.outcome.mining_advantage())
            ]);
        }
        samples.printstd();
    }
}

//! quarrysim - virtual quarry simulator
//!
//! Runs one quarry against the vanilla reference collaborators and reports
//! what it produced.

mod config;
mod content_pack;
mod quarry;

use anyhow::{Context, Result};
use quarry::Quarry;
use quarrysim_core::{scoped_rng, Catalyst, ModifierType, RegistryKey, ResourceStack, SimTick};
use quarrysim_sim::vanilla::{VanillaEnvironment, VanillaItemCatalog};
use quarrysim_sim::{
    merge_stacks, Collaborators, SimulationConfig, SimulationMode, StatisticsSnapshot,
    TableLootEngine, VirtualMiningSimulator, ZoneId,
};
use serde::Serialize;
use std::{env, fs, path::PathBuf, sync::Arc};
use tracing::{error, info, warn};

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting quarrysim v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let config = match &cli.config {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    };

    let report = run(&cli, config)?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    match &cli.report {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote report to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// What a run produced.
#[derive(Debug, Serialize)]
struct RunReport {
    version: &'static str,
    mode: SimulationMode,
    zone: String,
    seed: u64,
    catalyst: Catalyst,
    operations: u64,
    ticks: u64,
    ticks_per_operation: u32,
    energy_per_operation: u32,
    items_generated: u64,
    output: Vec<ResourceStack>,
    statistics: StatisticsSnapshot,
}

fn run(cli: &CliOptions, config: SimulationConfig) -> Result<RunReport> {
    let zone = ZoneId::parse(&cli.zone).with_context(|| format!("Invalid zone '{}'", cli.zone))?;

    let engine = Arc::new(TableLootEngine::with_vanilla_tables());
    let collaborators = Collaborators {
        environment: Arc::new(VanillaEnvironment::new()),
        items: Arc::new(VanillaItemCatalog::new()),
        loot: engine.clone(),
    };
    let simulator = Arc::new(VirtualMiningSimulator::new(config, collaborators));

    for pack in &cli.packs {
        content_pack::load_content_pack(pack, &simulator, Some(engine.as_ref()));
    }

    if !simulator
        .environment()
        .zones()
        .contains(&zone)
    {
        warn!(%zone, "zone is not known to the environment");
    }

    let mut quarry = Quarry::new(simulator.clone());
    quarry.set_mode(cli.mode);
    quarry.set_zone(Some(zone.clone()));
    quarry.set_catalyst(cli.catalyst());
    if let Some(token) = &cli.filter {
        let key = RegistryKey::parse(token).with_context(|| format!("Invalid filter '{token}'"))?;
        quarry.set_filter(Some(ResourceStack::new(key, 1)));
    }

    let ticks_per_operation = quarry.operation_ticks();
    let energy_per_operation = quarry.energy_per_operation();
    let transfer_rate = simulator.config().energy_transfer_rate.max(1);
    let stall_limit = u64::from(ticks_per_operation)
        + u64::from(energy_per_operation / transfer_rate)
        + 2;

    let mut rng = scoped_rng(cli.seed, zone_seed(&zone), SimTick::ZERO);
    let mut output = Vec::new();
    let mut tick = SimTick::ZERO;
    let mut idle = 0u64;

    while quarry.operations_completed() < cli.operations {
        quarry.receive_energy(transfer_rate);
        if quarry.tick(&mut rng) {
            idle = 0;
        } else {
            idle += 1;
            if idle > stall_limit {
                anyhow::bail!(
                    "Quarry stalled after {} operations (energy {}/{}, needs {} per operation)",
                    quarry.operations_completed(),
                    quarry.energy().stored(),
                    quarry.energy().capacity(),
                    energy_per_operation
                );
            }
        }
        output.extend(quarry.drain_output(usize::MAX));
        tick = tick.advance(1);
    }

    info!(
        mode = %cli.mode,
        %zone,
        operations = quarry.operations_completed(),
        ticks = tick.0,
        "Quarry run finished"
    );

    Ok(RunReport {
        version: env!("CARGO_PKG_VERSION"),
        mode: quarry.mode(),
        zone: zone.to_string(),
        seed: cli.seed,
        catalyst: quarry.catalyst().clone(),
        operations: quarry.operations_completed(),
        ticks: tick.0,
        ticks_per_operation,
        energy_per_operation,
        items_generated: quarry.items_generated(),
        output: merge_stacks(output),
        statistics: simulator.statistics().snapshot(),
    })
}

/// FNV-1a over the zone key, so every zone gets its own stream per seed.
fn zone_seed(zone: &ZoneId) -> u64 {
    zone.to_string()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
}

#[derive(Debug)]
struct CliOptions {
    mode: SimulationMode,
    zone: String,
    operations: u64,
    seed: u64,
    fortune: u32,
    silk_touch: bool,
    looting: u32,
    luck: u32,
    efficiency: u32,
    config: Option<PathBuf>,
    packs: Vec<PathBuf>,
    report: Option<PathBuf>,
    filter: Option<String>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            mode: SimulationMode::Mining,
            zone: "plains".to_string(),
            operations: 10,
            seed: 0,
            fortune: 0,
            silk_touch: false,
            looting: 0,
            luck: 0,
            efficiency: 0,
            config: None,
            packs: Vec::new(),
            report: None,
            filter: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--mode" => match args.next() {
                    Some(raw) => match SimulationMode::parse(&raw) {
                        Some(mode) => opts.mode = mode,
                        None => error!(value = %raw, "--mode must be mining, mob_drops or loot_table"),
                    },
                    None => error!("--mode requires a value"),
                },
                "--zone" => match args.next() {
                    Some(zone) => opts.zone = zone,
                    None => error!("--zone requires a zone key"),
                },
                "--operations" => parse_number(&mut args, "--operations", &mut opts.operations),
                "--seed" => parse_number(&mut args, "--seed", &mut opts.seed),
                "--fortune" => parse_number(&mut args, "--fortune", &mut opts.fortune),
                "--silk-touch" => opts.silk_touch = true,
                "--looting" => parse_number(&mut args, "--looting", &mut opts.looting),
                "--luck" => parse_number(&mut args, "--luck", &mut opts.luck),
                "--efficiency" => parse_number(&mut args, "--efficiency", &mut opts.efficiency),
                "--config" => match args.next() {
                    Some(path) => opts.config = Some(PathBuf::from(path)),
                    None => error!("--config requires a file path"),
                },
                "--pack" => match args.next() {
                    Some(path) => opts.packs.push(PathBuf::from(path)),
                    None => error!("--pack requires a file path"),
                },
                "--report" => match args.next() {
                    Some(path) => opts.report = Some(PathBuf::from(path)),
                    None => error!("--report requires a file path"),
                },
                "--filter" => match args.next() {
                    Some(item) => opts.filter = Some(item),
                    None => error!("--filter requires an item key"),
                },
                other => warn!(arg = %other, "Ignoring unknown argument"),
            }
        }

        opts
    }

    fn catalyst(&self) -> Catalyst {
        Catalyst::empty()
            .with(ModifierType::Fortune, self.fortune)
            .with(ModifierType::SilkTouch, u32::from(self.silk_touch))
            .with(ModifierType::Looting, self.looting)
            .with(ModifierType::Luck, self.luck)
            .with(ModifierType::Efficiency, self.efficiency)
    }
}

fn parse_number<I, T>(args: &mut I, flag: &str, slot: &mut T)
where
    I: Iterator<Item = String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match args.next() {
        Some(raw) => match raw.parse::<T>() {
            Ok(value) => *slot = value,
            Err(err) => error!(%err, value = %raw, "{flag} must be a non-negative integer"),
        },
        None => error!("{flag} requires an integer"),
    }
}

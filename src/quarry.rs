//! The quarry machine: energy buffer, operation timer and output queue around
//! a shared [`VirtualMiningSimulator`].

use quarrysim_core::{Catalyst, ResourceStack};
use quarrysim_sim::{ItemCatalog, SimulationMode, VirtualMiningSimulator, ZoneId};
use rand::RngCore;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Energy storage that accepts external input up to a per-tick rate and only
/// releases energy to the machine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyBuffer {
    stored: u32,
    capacity: u32,
    max_receive: u32,
}

impl EnergyBuffer {
    pub fn new(capacity: u32, max_receive: u32) -> Self {
        Self {
            stored: 0,
            capacity,
            max_receive,
        }
    }

    /// Offer `amount`; returns what was accepted. There is no external
    /// extraction.
    pub fn receive(&mut self, amount: u32) -> u32 {
        let accepted = amount
            .min(self.max_receive)
            .min(self.capacity - self.stored);
        self.stored += accepted;
        accepted
    }

    /// Consume energy for an operation, clamped at zero.
    pub fn extract_internal(&mut self, amount: u32) {
        self.stored -= amount.min(self.stored);
    }

    pub fn stored(&self) -> u32 {
        self.stored
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[derive(Debug, Clone, Copy)]
struct OperationCost {
    ticks: u32,
    energy: u32,
}

/// One quarry. Output is buffered in a queue the host drains with
/// [`Quarry::drain_output`].
pub struct Quarry {
    simulator: Arc<VirtualMiningSimulator>,
    mode: SimulationMode,
    zone: Option<ZoneId>,
    catalyst: Catalyst,
    filter: Option<ResourceStack>,
    redstone_control: bool,
    powered: bool,
    energy: EnergyBuffer,
    tick_counter: u32,
    cost: Option<OperationCost>,
    pending: VecDeque<ResourceStack>,
    operations_completed: u64,
    items_generated: u64,
}

impl Quarry {
    pub fn new(simulator: Arc<VirtualMiningSimulator>) -> Self {
        let config = simulator.config();
        let energy = EnergyBuffer::new(config.energy_capacity, config.energy_transfer_rate);
        Self {
            simulator,
            mode: SimulationMode::Mining,
            zone: None,
            catalyst: Catalyst::empty(),
            filter: None,
            redstone_control: false,
            powered: false,
            energy,
            tick_counter: 0,
            cost: None,
            pending: VecDeque::new(),
            operations_completed: 0,
            items_generated: 0,
        }
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SimulationMode) {
        self.mode = mode;
    }

    pub fn set_zone(&mut self, zone: Option<ZoneId>) {
        self.zone = zone;
    }

    /// Swap the catalyst; cached operation costs are recomputed.
    pub fn set_catalyst(&mut self, catalyst: Catalyst) {
        self.catalyst = catalyst;
        self.cost = None;
    }

    pub fn catalyst(&self) -> &Catalyst {
        &self.catalyst
    }

    /// Only keep output matching `filter`; `None` keeps everything.
    pub fn set_filter(&mut self, filter: Option<ResourceStack>) {
        self.filter = filter.filter(|stack| !stack.is_empty());
    }

    /// With redstone control on, the quarry only runs while powered.
    pub fn set_redstone_control(&mut self, enabled: bool) {
        self.redstone_control = enabled;
    }

    pub fn redstone_control(&self) -> bool {
        self.redstone_control
    }

    pub fn set_powered(&mut self, powered: bool) {
        self.powered = powered;
    }

    pub fn energy(&self) -> &EnergyBuffer {
        &self.energy
    }

    /// Accept energy from outside, limited by the transfer rate.
    pub fn receive_energy(&mut self, amount: u32) -> u32 {
        self.energy.receive(amount)
    }

    pub fn operations_completed(&self) -> u64 {
        self.operations_completed
    }

    pub fn items_generated(&self) -> u64 {
        self.items_generated
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn operation_ticks(&mut self) -> u32 {
        self.cost().ticks
    }

    pub fn energy_per_operation(&mut self) -> u32 {
        self.cost().energy
    }

    /// Progress toward the next operation, 0..=100.
    pub fn progress(&mut self) -> u32 {
        let ticks = self.operation_ticks();
        if ticks == 0 {
            return 0;
        }
        (u64::from(self.tick_counter) * 100 / u64::from(ticks)) as u32
    }

    fn cost(&mut self) -> OperationCost {
        if let Some(cost) = self.cost {
            return cost;
        }
        let cost = OperationCost {
            ticks: self.simulator.calculate_operation_ticks(&self.catalyst),
            energy: self.simulator.calculate_energy_per_operation(&self.catalyst),
        };
        self.cost = Some(cost);
        cost
    }

    fn can_operate(&mut self) -> bool {
        self.energy.stored() >= self.energy_per_operation()
            && self.zone.is_some()
            && self.pending_len() <= self.simulator.config().max_pending_output
    }

    /// Advance one tick. Returns true when an operation ran.
    pub fn tick(&mut self, rng: &mut dyn RngCore) -> bool {
        if self.redstone_control && !self.powered {
            return false;
        }
        if !self.can_operate() {
            return false;
        }

        self.tick_counter += 1;
        if self.tick_counter < self.operation_ticks() {
            return false;
        }
        self.tick_counter = 0;
        self.perform_operation(rng);
        true
    }

    fn perform_operation(&mut self, rng: &mut dyn RngCore) {
        let Some(zone) = self.zone.clone() else {
            return;
        };

        let drops = self
            .simulator
            .simulate(self.mode, &zone, &self.catalyst, rng);
        for drop in drops {
            if drop.is_empty() {
                continue;
            }
            if let Some(filter) = &self.filter {
                if !matches_filter(self.simulator.items(), &drop, filter) {
                    debug!(%drop, "filtered out");
                    continue;
                }
            }
            self.items_generated += u64::from(drop.count);
            self.pending.push_back(drop);
        }

        let energy = self.energy_per_operation();
        self.energy.extract_internal(energy);
        self.operations_completed += 1;
    }

    /// Remove up to `limit` queued stacks, oldest first.
    pub fn drain_output(&mut self, limit: usize) -> Vec<ResourceStack> {
        let count = limit.min(self.pending.len());
        self.pending.drain(..count).collect()
    }
}

/// Same item and variant, or any dictionary tag in common.
pub fn matches_filter(items: &dyn ItemCatalog, stack: &ResourceStack, filter: &ResourceStack) -> bool {
    if stack.item == filter.item && stack.variant == filter.variant {
        return true;
    }
    let filter_tags = items.dictionary_tags(&filter.resource_type());
    if filter_tags.is_empty() {
        return false;
    }
    items
        .dictionary_tags(&stack.resource_type())
        .iter()
        .any(|tag| filter_tags.contains(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarrysim_core::{ModifierType, ResourceType};
    use quarrysim_core::RegistryKey;
    use quarrysim_sim::vanilla::{vanilla_collaborators, VanillaItemCatalog};
    use quarrysim_sim::SimulationConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quarry_with(config: SimulationConfig) -> Quarry {
        let simulator = VirtualMiningSimulator::new(config, vanilla_collaborators());
        let mut quarry = Quarry::new(Arc::new(simulator));
        quarry.set_zone(Some(ZoneId::vanilla("plains")));
        quarry
    }

    #[test]
    fn energy_buffer_limits_input() {
        let mut buffer = EnergyBuffer::new(25, 10);
        assert_eq!(buffer.receive(50), 10);
        assert_eq!(buffer.receive(50), 10);
        assert_eq!(buffer.receive(50), 5);
        assert_eq!(buffer.receive(50), 0);
        assert_eq!(buffer.stored(), 25);
        buffer.extract_internal(100);
        assert_eq!(buffer.stored(), 0);
    }

    #[test]
    fn runs_one_operation_per_cycle() {
        let mut quarry = quarry_with(SimulationConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        quarry.receive_energy(10_000);

        let ran: usize = (0..100).filter(|_| quarry.tick(&mut rng)).count();
        assert_eq!(ran, 1);
        assert_eq!(quarry.operations_completed(), 1);
        assert_eq!(quarry.energy().stored(), 9_000);
        assert_eq!(quarry.progress(), 0);

        for _ in 0..50 {
            quarry.tick(&mut rng);
        }
        assert_eq!(quarry.progress(), 50);
    }

    #[test]
    fn idles_without_energy_or_zone() {
        let mut quarry = quarry_with(SimulationConfig::default());
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            assert!(!quarry.tick(&mut rng));
        }

        quarry.receive_energy(10_000);
        quarry.set_zone(None);
        for _ in 0..200 {
            assert!(!quarry.tick(&mut rng));
        }
        assert_eq!(quarry.operations_completed(), 0);
    }

    #[test]
    fn redstone_control_pauses_until_powered() {
        let mut quarry = quarry_with(SimulationConfig::default());
        let mut rng = StdRng::seed_from_u64(6);
        quarry.receive_energy(10_000);
        quarry.set_redstone_control(true);
        assert!(quarry.redstone_control());

        for _ in 0..300 {
            assert!(!quarry.tick(&mut rng));
        }
        assert_eq!(quarry.progress(), 0);
        assert_eq!(quarry.energy().stored(), 10_000);

        quarry.set_powered(true);
        let ran = (0..100).filter(|_| quarry.tick(&mut rng)).count();
        assert_eq!(ran, 1);

        quarry.set_powered(false);
        quarry.set_redstone_control(false);
        let ran = (0..100).filter(|_| quarry.tick(&mut rng)).count();
        assert_eq!(ran, 1);
        assert_eq!(quarry.operations_completed(), 2);
    }

    #[test]
    fn catalyst_change_invalidates_cached_costs() {
        let mut quarry = quarry_with(SimulationConfig::default());
        assert_eq!(quarry.operation_ticks(), 100);
        assert_eq!(quarry.energy_per_operation(), 1000);

        quarry.set_catalyst(Catalyst::empty().with(ModifierType::Efficiency, 5));
        assert_eq!(quarry.operation_ticks(), 25);
        assert_eq!(quarry.energy_per_operation(), 2000);
    }

    #[test]
    fn pending_queue_caps_operations() {
        let config = SimulationConfig {
            base_ticks_per_operation: 1,
            min_ticks_per_operation: 1,
            energy_per_operation: 0,
            max_pending_output: 2,
            ..SimulationConfig::default()
        };
        let mut quarry = quarry_with(config);
        quarry.set_mode(SimulationMode::LootTable);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..500 {
            quarry.tick(&mut rng);
        }
        assert!(quarry.pending_len() > 2);
        let stalled = quarry.operations_completed();
        for _ in 0..50 {
            assert!(!quarry.tick(&mut rng));
        }
        assert_eq!(quarry.operations_completed(), stalled);

        let drained = quarry.drain_output(usize::MAX);
        assert!(!drained.is_empty());
        assert_eq!(quarry.pending_len(), 0);
        assert!(quarry.tick(&mut rng));
    }

    #[test]
    fn engine_failures_still_cost_energy() {
        use quarrysim_testkit::{
            scripted_collaborators, seeded_rng, FailingLootEngine, ScriptedEnvironment,
            StaticItemCatalog,
        };

        let engine = Arc::new(FailingLootEngine::default());
        let collaborators = scripted_collaborators(
            ScriptedEnvironment::new(),
            StaticItemCatalog::new(),
            engine.clone(),
        );
        let simulator = VirtualMiningSimulator::new(SimulationConfig::default(), collaborators);
        let mut quarry = Quarry::new(Arc::new(simulator));
        quarry.set_mode(SimulationMode::LootTable);
        quarry.set_zone(Some(ZoneId::vanilla("plains")));
        quarry.receive_energy(10_000);

        let mut rng = seeded_rng(5);
        for _ in 0..300 {
            quarry.tick(&mut rng);
        }
        assert_eq!(quarry.operations_completed(), 3);
        assert_eq!(quarry.items_generated(), 0);
        assert_eq!(quarry.energy().stored(), 7_000);
        assert_eq!(engine.calls(), 3);
    }

    #[test]
    fn filter_matches_items_and_shared_tags() {
        let items = VanillaItemCatalog::new();
        let granite = ResourceType::with_variant(RegistryKey::vanilla("stone"), 1);
        let diorite = ResourceType::with_variant(RegistryKey::vanilla("stone"), 3);
        let coal = ResourceStack::vanilla("coal", 2);

        assert!(matches_filter(&items, &coal, &ResourceStack::vanilla("coal", 1)));
        assert!(matches_filter(&items, &granite.to_stack(1), &diorite.to_stack(1)));
        assert!(!matches_filter(&items, &coal, &diorite.to_stack(1)));
        assert!(!matches_filter(&items, &ResourceStack::vanilla("flint", 1), &coal));
    }

    #[test]
    fn filter_drops_non_matching_output() {
        let config = SimulationConfig {
            base_ticks_per_operation: 1,
            min_ticks_per_operation: 1,
            energy_per_operation: 0,
            ..SimulationConfig::default()
        };
        let mut quarry = quarry_with(config);
        quarry.set_filter(Some(ResourceStack::vanilla("coal", 1)));
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            quarry.tick(&mut rng);
        }
        let output = quarry.drain_output(usize::MAX);
        assert!(!output.is_empty());
        assert!(output.iter().all(|stack| stack.item.path() == "coal"));
        let total: u64 = output.iter().map(|s| u64::from(s.count)).sum();
        assert_eq!(total, quarry.items_generated());
    }
}

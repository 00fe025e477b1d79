//! Cycle-Ordered Time Series Store

use crate::{EntityId, Reading, StoreError};
use std::collections::BTreeMap;
use tracing::debug;

/// Readings of a single engine, strictly increasing by cycle
#[derive(Debug, Clone)]
pub struct TimeSeries {
    entity_id: EntityId,
    readings: Vec<Reading>,
}

impl TimeSeries {
    /// Create an empty series for an engine
    pub fn new(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            readings: Vec::new(),
        }
    }

    /// Build a series from readings of one engine, sorting by cycle
    pub fn from_readings(
        entity_id: EntityId,
        readings: impl IntoIterator<Item = Reading>,
    ) -> Result<Self, StoreError> {
        let mut series = Self::new(entity_id);
        for reading in readings {
            series.insert(reading)?;
        }
        Ok(series)
    }

    /// Insert a reading, keeping cycle order
    pub fn insert(&mut self, reading: Reading) -> Result<(), StoreError> {
        if reading.cycle == 0 {
            return Err(StoreError::InvalidCycle {
                entity_id: reading.entity_id,
                cycle: reading.cycle,
            });
        }
        if reading.entity_id != self.entity_id {
            return Err(StoreError::EntityMismatch {
                expected: self.entity_id,
                found: reading.entity_id,
            });
        }

        // Fast path: ingestion order is almost always ascending
        match self.readings.last() {
            Some(last) if last.cycle < reading.cycle => {
                self.readings.push(reading);
                return Ok(());
            }
            None => {
                self.readings.push(reading);
                return Ok(());
            }
            _ => {}
        }

        match self.readings.binary_search_by_key(&reading.cycle, |r| r.cycle) {
            Ok(_) => Err(StoreError::DuplicateCycle {
                entity_id: reading.entity_id,
                cycle: reading.cycle,
            }),
            Err(pos) => {
                self.readings.insert(pos, reading);
                Ok(())
            }
        }
    }

    /// Engine identifier
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Readings in ascending cycle order
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Check if the series has no readings
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Last observed cycle
    pub fn max_cycle(&self) -> Option<u32> {
        self.readings.last().map(|r| r.cycle)
    }

    /// Values of one sensor channel in cycle order
    pub fn channel_values(&self, index: usize) -> Vec<f64> {
        self.readings
            .iter()
            .filter_map(|r| r.sensor(index))
            .collect()
    }
}

/// Store of all engines' series, keyed by engine id
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesStore {
    series: BTreeMap<EntityId, TimeSeries>,
}

impl TimeSeriesStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from readings in any order
    pub fn from_readings(readings: impl IntoIterator<Item = Reading>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for reading in readings {
            store.insert(reading)?;
        }
        debug!(
            "Built store with {} engines, {} readings",
            store.entity_count(),
            store.len()
        );
        Ok(store)
    }

    /// Insert a reading into its engine's series
    pub fn insert(&mut self, reading: Reading) -> Result<(), StoreError> {
        self.series
            .entry(reading.entity_id)
            .or_insert_with(|| TimeSeries::new(reading.entity_id))
            .insert(reading)
    }

    /// Series for one engine
    pub fn get(&self, entity_id: EntityId) -> Option<&TimeSeries> {
        self.series.get(&entity_id)
    }

    /// Reading at `(entity_id, sequence_index)`
    pub fn reading(&self, entity_id: EntityId, index: usize) -> Option<&Reading> {
        self.series.get(&entity_id)?.readings.get(index)
    }

    /// All series in ascending engine id order
    pub fn iter(&self) -> impl Iterator<Item = &TimeSeries> {
        self.series.values()
    }

    /// Engine ids in ascending order
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.series.keys().copied()
    }

    /// Number of engines
    pub fn entity_count(&self) -> usize {
        self.series.len()
    }

    /// Total number of readings across engines
    pub fn len(&self) -> usize {
        self.series.values().map(TimeSeries::len).sum()
    }

    /// Check if the store holds no readings
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SENSOR_COUNT, SETTING_COUNT};
    use proptest::prelude::*;

    fn reading(entity_id: EntityId, cycle: u32, value: f64) -> Reading {
        Reading {
            entity_id,
            cycle,
            operational_settings: [0.0; SETTING_COUNT],
            sensor_values: [value; SENSOR_COUNT],
        }
    }

    #[test]
    fn test_insert_keeps_cycle_order() {
        let mut store = TimeSeriesStore::new();
        for cycle in [3, 1, 2, 5, 4] {
            store.insert(reading(1, cycle, cycle as f64)).unwrap();
        }

        let cycles: Vec<u32> = store.get(1).unwrap().readings().iter().map(|r| r.cycle).collect();
        assert_eq!(cycles, vec![1, 2, 3, 4, 5]);
        assert_eq!(store.reading(1, 0).unwrap().cycle, 1);
    }

    #[test]
    fn test_duplicate_cycle_rejected() {
        let mut store = TimeSeriesStore::new();
        store.insert(reading(7, 10, 1.0)).unwrap();
        store.insert(reading(7, 12, 1.0)).unwrap();

        let err = store.insert(reading(7, 10, 2.0)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCycle { entity_id: 7, cycle: 10 }));
    }

    #[test]
    fn test_zero_cycle_rejected() {
        let mut store = TimeSeriesStore::new();
        let err = store.insert(reading(1, 0, 1.0)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidCycle { .. }));
    }

    #[test]
    fn test_entities_kept_apart() {
        let store = TimeSeriesStore::from_readings(vec![
            reading(2, 1, 20.0),
            reading(1, 1, 10.0),
            reading(2, 2, 21.0),
            reading(1, 2, 11.0),
        ])
        .unwrap();

        assert_eq!(store.entity_count(), 2);
        assert_eq!(store.len(), 4);
        assert_eq!(store.entity_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(store.get(2).unwrap().channel_values(0), vec![20.0, 21.0]);
        assert_eq!(store.get(1).unwrap().max_cycle(), Some(2));
    }

    #[test]
    fn test_foreign_entity_rejected() {
        let err = TimeSeries::from_readings(1, vec![reading(1, 1, 10.0), reading(2, 2, 1000.0)])
            .unwrap_err();
        assert!(matches!(err, StoreError::EntityMismatch { expected: 1, found: 2 }));

        let mut series = TimeSeries::new(3);
        assert!(series.insert(reading(4, 1, 1.0)).is_err());
        assert!(series.is_empty());
    }

    proptest! {
        #[test]
        fn prop_insertion_order_irrelevant(
            cycles in prop::collection::btree_set(1u32..500, 1..60),
            seed in any::<u64>(),
        ) {
            let ascending: Vec<u32> = cycles.iter().copied().collect();
            // Deterministic shuffle by sorting on a seeded hash
            let mut shuffled = ascending.clone();
            shuffled.sort_by_key(|c| (u64::from(*c)).wrapping_mul(seed | 1).rotate_left(17));

            let a = TimeSeries::from_readings(1, ascending.iter().map(|&c| reading(1, c, f64::from(c)))).unwrap();
            let b = TimeSeries::from_readings(1, shuffled.iter().map(|&c| reading(1, c, f64::from(c)))).unwrap();
            prop_assert_eq!(a.readings(), b.readings());
            prop_assert_eq!(a.max_cycle(), ascending.last().copied());
        }
    }
}

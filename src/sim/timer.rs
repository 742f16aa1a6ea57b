//! Timers on the simulation clock
//!
//! Repeating timers drive the spawners; one-shot timers end the shield.
//! Firing order is stable: by due time, then by timer id.

/// Handle returned when scheduling a timer
pub type TimerId = u32;

/// What a timer does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Run the spawn rule at this index in the tuning table
    Spawn { rule: usize },
    /// Clear the shield
    ShieldExpire,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    due_us: u64,
    /// Repeat period, `None` for one-shot
    period_us: Option<u64>,
    action: TimerAction,
}

/// Pending timers
#[derive(Debug, Clone, Default)]
pub struct Timers {
    timers: Vec<Timer>,
    next_id: TimerId,
}

impl Timers {
    /// Schedule `action` every `period_us`, first firing one period from `now_us`
    pub fn every(&mut self, now_us: u64, period_us: u64, action: TimerAction) -> TimerId {
        let period_us = period_us.max(1);
        self.insert(now_us + period_us, Some(period_us), action)
    }

    /// Schedule `action` once, `delay_us` from `now_us`
    pub fn after(&mut self, now_us: u64, delay_us: u64, action: TimerAction) -> TimerId {
        self.insert(now_us + delay_us, None, action)
    }

    fn insert(&mut self, due_us: u64, period_us: Option<u64>, action: TimerAction) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        self.timers.push(Timer {
            id,
            due_us,
            period_us,
            action,
        });
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Collect every firing due at or before `now_us`, in firing order.
    ///
    /// A repeating timer that fell several periods behind fires once per
    /// missed period. One-shot timers are removed once they fire.
    pub fn fire_due(&mut self, now_us: u64) -> Vec<(TimerId, TimerAction)> {
        let mut fired = Vec::new();
        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due_us <= now_us)
                .min_by_key(|(_, t)| (t.due_us, t.id))
                .map(|(index, _)| index);

            let Some(index) = next else { break };
            let timer = &mut self.timers[index];
            fired.push((timer.id, timer.action));
            let period_us = timer.period_us;
            match period_us {
                Some(period) => timer.due_us += period,
                None => {
                    self.timers.remove(index);
                }
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeating_timer_fires_each_period() {
        let mut timers = Timers::default();
        let id = timers.every(0, 1000, TimerAction::Spawn { rule: 0 });

        assert!(timers.fire_due(999).is_empty());
        assert_eq!(timers.fire_due(1000), vec![(id, TimerAction::Spawn { rule: 0 })]);
        assert!(timers.fire_due(1500).is_empty());
        // Fell behind two periods: fires twice
        assert_eq!(timers.fire_due(3000).len(), 2);
        // Still scheduled
        assert!(timers.cancel(id));
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = Timers::default();
        let id = timers.after(100, 5000, TimerAction::ShieldExpire);

        assert!(timers.fire_due(5099).is_empty());
        assert_eq!(timers.fire_due(5100), vec![(id, TimerAction::ShieldExpire)]);
        assert!(timers.is_empty());
        assert!(!timers.cancel(id));
    }

    #[test]
    fn test_firing_order_by_due_then_id() {
        let mut timers = Timers::default();
        let slow = timers.every(0, 2000, TimerAction::Spawn { rule: 1 });
        let fast = timers.every(0, 1000, TimerAction::Spawn { rule: 0 });
        let shield = timers.after(0, 2000, TimerAction::ShieldExpire);

        let fired: Vec<TimerId> = timers.fire_due(2000).into_iter().map(|(id, _)| id).collect();
        // fast@1000, slow@2000, fast@2000, shield@2000 ordered by id at equal due times
        assert_eq!(fired, vec![fast, slow, fast, shield]);
    }

    #[test]
    fn test_cancel() {
        let mut timers = Timers::default();
        let id = timers.after(0, 10, TimerAction::ShieldExpire);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.fire_due(100).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut timers = Timers::default();
        timers.every(0, 10, TimerAction::Spawn { rule: 0 });
        timers.after(0, 10, TimerAction::ShieldExpire);
        assert_eq!(timers.len(), 2);
        timers.clear();
        assert!(timers.is_empty());
    }
}

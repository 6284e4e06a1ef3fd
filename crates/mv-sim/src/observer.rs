//! Simulation observer trait for progress reporting and event collection.

use mv_core::Tick;
use mv_movement::MovementEvent;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — arrival printer
///
/// ```rust,ignore
/// struct Arrivals;
///
/// impl SimObserver for Arrivals {
///     fn on_event(&mut self, tick: Tick, event: &MovementEvent) {
///         if event.kind == MovementEventKind::Arrived {
///             println!("{tick}: {} arrived", event.unit);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before path answers are polled.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per movement event, in the order the tick produced them.
    ///
    /// Events returned directly by [`Sim::move_unit`][crate::Sim::move_unit]
    /// do not pass through here.
    fn on_event(&mut self, _tick: Tick, _event: &MovementEvent) {}

    /// Called at the end of each tick with the number of events it produced.
    fn on_tick_end(&mut self, _tick: Tick, _events: usize) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Records every event with the tick it happened on.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<(Tick, MovementEvent)>,
}

impl SimObserver for EventLog {
    fn on_event(&mut self, tick: Tick, event: &MovementEvent) {
        self.events.push((tick, *event));
    }
}

/// Run two observers side by side; `A` sees every hook first.
impl<A: SimObserver, B: SimObserver> SimObserver for (A, B) {
    fn on_tick_start(&mut self, tick: Tick) {
        self.0.on_tick_start(tick);
        self.1.on_tick_start(tick);
    }

    fn on_event(&mut self, tick: Tick, event: &MovementEvent) {
        self.0.on_event(tick, event);
        self.1.on_event(tick, event);
    }

    fn on_tick_end(&mut self, tick: Tick, events: usize) {
        self.0.on_tick_end(tick, events);
        self.1.on_tick_end(tick, events);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.0.on_sim_end(final_tick);
        self.1.on_sim_end(final_tick);
    }
}

impl<T: SimObserver + ?Sized> SimObserver for &mut T {
    fn on_tick_start(&mut self, tick: Tick) {
        (**self).on_tick_start(tick);
    }

    fn on_event(&mut self, tick: Tick, event: &MovementEvent) {
        (**self).on_event(tick, event);
    }

    fn on_tick_end(&mut self, tick: Tick, events: usize) {
        (**self).on_tick_end(tick, events);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        (**self).on_sim_end(final_tick);
    }
}

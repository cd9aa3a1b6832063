//! Module interfaces
//!
//! Every cyclic control module in `mars_exec` implements `State`, so the
//! executable drives them all the same way: `init` once from a parameter
//! file, then `proc` exactly once per cycle.
//!
//! Modules commanded through setters also implement `Demanded`. Their
//! demands only hold for the cycle they were written in: `proc` takes them
//! with `Demanded::take_demands`, which leaves the neutral demands (stop,
//! retracted) in their place. A caller which writes nothing in a cycle
//! therefore commands the neutral state rather than repeating its last
//! demand.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A cyclic control module.
///
/// Modules are constructed with `Default` and made usable by `init`. Those
/// which can run without a session also provide a `new` taking their
/// parameters directly.
pub trait State {
    /// Data required during initialisation, usually the parameter file name.
    type InitData;
    type InitError;

    /// Feedback read at the start of the cycle. Demands are not part of the
    /// input, they are written through the module's setters.
    type InputData;
    /// Demands for the actuators this cycle.
    type OutputData;
    type StatusReport;
    /// Never raised by the control paths, which clamp rather than reject.
    type ProcError;

    /// Load parameters and open the module's archives in `session`.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one cycle on this cycle's feedback and demands.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}

/// A module whose demands are written between cycles and consumed by the
/// next call to `State::proc`.
pub trait Demanded {
    /// Demands written through the module's setters. The `Default` value is
    /// the neutral demand.
    type Demands: Default;

    /// The demands written so far this cycle.
    fn demands(&self) -> &Self::Demands;

    fn demands_mut(&mut self) -> &mut Self::Demands;

    /// Take this cycle's demands for processing, leaving the neutral demands
    /// behind.
    fn take_demands(&mut self) -> Self::Demands {
        std::mem::take(self.demands_mut())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Dems {
        speed: f64,
        extend: bool,
    }

    #[derive(Default)]
    struct Motor {
        dems: Dems,
    }

    impl Demanded for Motor {
        type Demands = Dems;

        fn demands(&self) -> &Dems {
            &self.dems
        }

        fn demands_mut(&mut self) -> &mut Dems {
            &mut self.dems
        }
    }

    #[test]
    fn test_take_demands_leaves_neutral() {
        let mut m = Motor::default();
        m.demands_mut().speed = 0.4;
        m.demands_mut().extend = true;

        assert_eq!(
            m.take_demands(),
            Dems {
                speed: 0.4,
                extend: true
            }
        );
        assert_eq!(*m.demands(), Dems::default());
        assert_eq!(m.take_demands(), Dems::default());
    }
}

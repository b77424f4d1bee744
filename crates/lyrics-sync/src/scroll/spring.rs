use crate::config::ScrollConfig;

/// Fixed integration substep. Keeps the semi-implicit Euler update stable for
/// stiff springs regardless of the host frame rate.
const SUBSTEP_S: f64 = 1.0 / 240.0;

/// Snapshot of the scroll spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringState {
    pub position: f64,
    pub velocity: f64,
    pub target: f64,
}

/// Damped-oscillator scroll animation.
///
/// Retargeting keeps the current velocity, so a line change mid-flight bends
/// the motion toward the new target instead of restarting it.
#[derive(Debug, Clone)]
pub struct Spring {
    mass: f64,
    stiffness: f64,
    damping: f64,
    epsilon: f64,
    state: SpringState,
}

impl Spring {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            mass: config.spring_mass,
            stiffness: config.spring_stiffness,
            damping: config.spring_damping(),
            epsilon: config.settle_epsilon,
            state: SpringState {
                position: 0.0,
                velocity: 0.0,
                target: 0.0,
            },
        }
    }

    pub fn state(&self) -> SpringState {
        self.state
    }

    pub fn position(&self) -> f64 {
        self.state.position
    }

    pub fn target(&self) -> f64 {
        self.state.target
    }

    pub fn is_animating(&self) -> bool {
        self.state.position != self.state.target || self.state.velocity != 0.0
    }

    pub fn retarget(&mut self, target: f64) {
        self.state.target = target;
    }

    /// Place the spring at rest at `position`.
    pub fn snap_to(&mut self, position: f64) {
        self.state = SpringState {
            position,
            velocity: 0.0,
            target: position,
        };
    }

    /// Advance by `dt_s` seconds and return the new position.
    pub fn step(&mut self, dt_s: f64) -> f64 {
        let mut remaining = dt_s.max(0.0);
        while remaining > 0.0 && self.is_animating() {
            let h = remaining.min(SUBSTEP_S);
            remaining -= h;

            let SpringState {
                position,
                velocity,
                target,
            } = self.state;
            let accel =
                (-self.stiffness * (position - target) - self.damping * velocity) / self.mass;
            let velocity = velocity + accel * h;
            let position = position + velocity * h;
            self.state.velocity = velocity;
            self.state.position = position;

            if (position - target).abs() < self.epsilon && velocity.abs() < self.epsilon {
                self.snap_to(target);
            }
        }
        self.state.position
    }
}

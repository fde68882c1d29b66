//! Named, reference-counted, smoothed control values.
//!
//! A control value is a pair of floats that external code (a host UI, a
//! controller) moves by setting a *desired* pair; every tick the *current*
//! pair decays exponentially toward it:
//!
//! ```text
//! retain  = smoothness ^ dt
//! current = current * retain + desired * (1 - retain)
//! ```
//!
//! With `smoothness` in (0, 1) and `dt > 0`, `retain` is in (0, 1), so
//! `current` moves monotonically toward `desired` and never overshoots.
//! `smoothness` is the fraction of the remaining distance left after one
//! second.
//!
//! Entries are kept sorted by name. Registering an existing name only bumps
//! its reference count; the entry disappears when the count returns to zero.

use libm::powf;

use super::memory::MemoryBanks;

/// Dimensionality hint for tooling. Both kinds store a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ControlKind {
    /// Only `x` is meaningful.
    #[default]
    Scalar,
    /// `x` and `y` are both meaningful.
    Vector2,
}

/// Registration parameters for a control value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlValueSpec {
    /// Dimensionality hint.
    pub kind: ControlKind,
    /// Lower bound for desired values.
    pub min: f32,
    /// Upper bound for desired values.
    pub max: f32,
    /// Fraction of the distance to the target remaining after one second.
    pub smoothness: f32,
    /// Initial pair for both desired and current.
    pub default: [f32; 2],
}

impl Default for ControlValueSpec {
    fn default() -> Self {
        Self {
            kind: ControlKind::Scalar,
            min: 0.0,
            max: 1.0,
            smoothness: 0.2,
            default: [0.0, 0.0],
        }
    }
}

impl ControlValueSpec {
    /// A scalar control in `[min, max]` starting at `default`.
    pub fn scalar(min: f32, max: f32, smoothness: f32, default: f32) -> Self {
        Self {
            kind: ControlKind::Scalar,
            min,
            max,
            smoothness,
            default: [default, 0.0],
        }
    }

    /// A two-dimensional control in `[min, max]` on both axes.
    pub fn vector2(min: f32, max: f32, smoothness: f32, default: [f32; 2]) -> Self {
        Self {
            kind: ControlKind::Vector2,
            min,
            max,
            smoothness,
            default,
        }
    }
}

impl ControlValueSpec {
    /// Smoothness outside `[0, 1]` would make `retain` NaN or above one, so
    /// it is clamped (NaN becomes 0, an immediate jump) with a warning.
    fn sanitized(mut self, name: &str) -> Self {
        let clamped = if self.smoothness.is_nan() {
            0.0
        } else {
            self.smoothness.clamp(0.0, 1.0)
        };
        if clamped != self.smoothness {
            tracing::warn!(
                name,
                smoothness = self.smoothness,
                clamped,
                "control value smoothness out of range"
            );
            self.smoothness = clamped;
        }
        self
    }
}

/// One registered control value.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlValue {
    name: String,
    spec: ControlValueSpec,
    desired: [f32; 2],
    current: [f32; 2],
    ref_count: u32,
}

impl ControlValue {
    fn new(name: &str, spec: ControlValueSpec) -> Self {
        Self {
            name: name.to_string(),
            spec,
            desired: spec.default,
            current: spec.default,
            ref_count: 1,
        }
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registration parameters.
    pub fn spec(&self) -> &ControlValueSpec {
        &self.spec
    }

    /// Target pair.
    pub fn desired(&self) -> [f32; 2] {
        self.desired
    }

    /// Smoothed pair.
    pub fn current(&self) -> [f32; 2] {
        self.current
    }

    /// Number of outstanding registrations.
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    fn set_desired(&mut self, x: f32, y: f32) {
        let (lo, hi) = if self.spec.min <= self.spec.max {
            (self.spec.min, self.spec.max)
        } else {
            (self.spec.max, self.spec.min)
        };
        self.desired = [x.clamp(lo, hi), y.clamp(lo, hi)];
    }

    fn advance(&mut self, dt: f32) {
        let retain = powf(self.spec.smoothness, dt);
        for axis in 0..2 {
            self.current[axis] =
                self.current[axis] * retain + self.desired[axis] * (1.0 - retain);
        }
    }
}

/// Outcome of [`ControlValueRegistry::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// A new entry was created.
    Inserted,
    /// The name already existed; its reference count is now the given value.
    Shared(u32),
}

/// Sorted table of control values. Not synchronized on its own; it lives
/// inside [`SharedState`](super::SharedState).
#[derive(Debug, Default)]
pub struct ControlValueRegistry {
    entries: Vec<ControlValue>,
}

impl ControlValueRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|entry| entry.name.as_str().cmp(name))
    }

    /// Registers `name`, or bumps its reference count if it exists. The
    /// parameters of an existing entry are left untouched.
    pub fn register(&mut self, name: &str, spec: ControlValueSpec) -> Registration {
        match self.position(name) {
            Ok(idx) => {
                let entry = &mut self.entries[idx];
                entry.ref_count += 1;
                Registration::Shared(entry.ref_count)
            }
            Err(idx) => {
                let spec = spec.sanitized(name);
                self.entries.insert(idx, ControlValue::new(name, spec));
                Registration::Inserted
            }
        }
    }

    /// Drops one reference to `name`. Returns the remaining count, or `None`
    /// if the name is not registered.
    pub fn unregister(&mut self, name: &str) -> Option<u32> {
        let idx = self.position(name).ok()?;
        let entry = &mut self.entries[idx];
        entry.ref_count -= 1;
        let remaining = entry.ref_count;
        if remaining == 0 {
            self.entries.remove(idx);
        }
        Some(remaining)
    }

    /// Looks up `name`.
    pub fn find(&self, name: &str) -> Option<&ControlValue> {
        self.position(name).ok().map(|idx| &self.entries[idx])
    }

    /// Sets the desired pair of `name`, clamped to its bounds. Returns false if
    /// the name is not registered.
    pub fn set_desired(&mut self, name: &str, x: f32, y: f32) -> bool {
        match self.position(name) {
            Ok(idx) => {
                self.entries[idx].set_desired(x, y);
                true
            }
            Err(_) => false,
        }
    }

    /// Moves every current pair toward its desired pair by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        for entry in &mut self.entries {
            entry.advance(dt);
        }
    }

    /// Writes every current pair into the numeric bank under the entry's name,
    /// as `[x, y, 0, 0]`.
    pub fn export_to(&self, banks: &mut MemoryBanks) {
        for entry in &self.entries {
            banks.set_numeric(
                &entry.name,
                [entry.current[0], entry.current[1], 0.0, 0.0],
            );
        }
    }

    /// All entries, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &ControlValue> {
        self.entries.iter()
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

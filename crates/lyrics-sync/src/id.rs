pub trait IdGenerator: Send + Sync {
    fn next_id(&mut self) -> String;
}

pub struct UuidIdGen;

impl Default for UuidIdGen {
    fn default() -> Self {
        Self
    }
}

impl IdGenerator for UuidIdGen {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic line IDs (`line-0`, `line-1`, …) for tests and fixtures
/// where the rendered output must be reproducible.
pub struct SequentialIdGen(u64);

impl SequentialIdGen {
    pub fn new() -> Self {
        Self(0)
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGen {
    fn next_id(&mut self) -> String {
        let id = self.0;
        self.0 += 1;
        format!("line-{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_stable() {
        let mut id_gen = SequentialIdGen::new();
        assert_eq!(id_gen.next_id(), "line-0");
        assert_eq!(id_gen.next_id(), "line-1");
    }

    #[test]
    fn uuid_ids_are_unique() {
        let mut id_gen = UuidIdGen;
        assert_ne!(id_gen.next_id(), id_gen.next_id());
    }
}

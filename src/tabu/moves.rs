//! Single-entry reassignment moves.

use serde::{Deserialize, Serialize};

use crate::ga::Dimension;
use crate::models::{Instance, TimetableEntry};

/// Sets one dimension of one entry to a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Lesson position in the schedule.
    pub entry: usize,
    /// Dimension being changed.
    pub dimension: Dimension,
    /// New slot, room or teacher index.
    pub value: usize,
}

impl Move {
    /// Creates a move.
    pub fn new(entry: usize, dimension: Dimension, value: usize) -> Self {
        Self {
            entry,
            dimension,
            value,
        }
    }

    /// The move that restores `previous` in this move's dimension.
    pub fn reverse(&self, previous: &TimetableEntry) -> Move {
        Move::new(self.entry, self.dimension, self.dimension.value_of(previous))
    }
}

/// Values a dimension may take for an entry: every slot, the course's
/// room pool, the course's teacher pool. The current value is excluded.
pub(crate) fn candidate_values<'a>(
    instance: &'a Instance,
    entry: &TimetableEntry,
    dimension: Dimension,
) -> impl Iterator<Item = usize> + 'a {
    let current = dimension.value_of(entry);
    let pool: &'a [usize] = match dimension {
        Dimension::Slot => &[],
        Dimension::Room => instance.room_pool(entry.course),
        Dimension::Teacher => instance.teacher_pool(entry.course),
    };
    let slots = match dimension {
        Dimension::Slot => 0..instance.num_slots(),
        _ => 0..0,
    };
    slots
        .chain(pool.iter().copied())
        .filter(move |&v| v != current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Room, Teacher, TimeSlot};

    #[test]
    fn test_reverse_restores_previous_value() {
        let prev = TimetableEntry::new(0, 1, 2, 3);
        let mv = Move::new(4, Dimension::Room, 0);
        assert_eq!(mv.reverse(&prev), Move::new(4, Dimension::Room, 2));
        let mv = Move::new(4, Dimension::Slot, 0);
        assert_eq!(mv.reverse(&prev).value, 3);
    }

    #[test]
    fn test_candidate_values() {
        let slots = TimeSlot::grid(1, 4);
        let inst = Instance::new(
            vec![Course::new("C1", 1).with_feature("lab")],
            vec![
                Room::new("R1", 10).with_feature("lab"),
                Room::new("R2", 10),
                Room::new("R3", 10).with_feature("lab"),
            ],
            vec![
                Teacher::new("T1").qualified_for("C1"),
                Teacher::new("T2"),
            ],
            slots,
        )
        .unwrap();
        let e = TimetableEntry::new(0, 0, 0, 1);

        let slots: Vec<usize> = candidate_values(&inst, &e, Dimension::Slot).collect();
        assert_eq!(slots, vec![0, 2, 3]);
        let rooms: Vec<usize> = candidate_values(&inst, &e, Dimension::Room).collect();
        assert_eq!(rooms, vec![2]);
        let teachers: Vec<usize> = candidate_values(&inst, &e, Dimension::Teacher).collect();
        assert!(teachers.is_empty());
    }
}

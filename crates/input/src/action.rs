/// A named input flag. Raw keys are mapped to actions by [`crate::KeyBindings`];
/// gameplay code only ever reads actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Jump,
    Slot1,
    Slot2,
    Slot3,
    Slot4,
    Slot5,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Slot1,
        Action::Slot2,
        Action::Slot3,
        Action::Slot4,
        Action::Slot5,
    ];

    /// Flag name as exposed to UI and logs.
    pub fn name(self) -> &'static str {
        match self {
            Action::MoveForward => "move_forward",
            Action::MoveBackward => "move_backward",
            Action::MoveLeft => "move_left",
            Action::MoveRight => "move_right",
            Action::Jump => "jump",
            Action::Slot1 => "slot1",
            Action::Slot2 => "slot2",
            Action::Slot3 => "slot3",
            Action::Slot4 => "slot4",
            Action::Slot5 => "slot5",
        }
    }

    /// Hot-bar slot (1-based) for the slot actions.
    pub fn hotbar_slot(self) -> Option<usize> {
        match self {
            Action::Slot1 => Some(1),
            Action::Slot2 => Some(2),
            Action::Slot3 => Some(3),
            Action::Slot4 => Some(4),
            Action::Slot5 => Some(5),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

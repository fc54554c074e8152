/// Everything the operator can do, after input mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Tick,
    Quit,
    /// Submit whatever the current screen submits: login, the form, or a
    /// batch decision.
    Confirm,
    /// Leave the current dialog; on a decision screen this aborts the
    /// suspended submission.
    Back,
    MoveUp,
    MoveDown,
    FocusNext,
    FocusPrev,
    CycleLeft,
    CycleRight,
    StartEdit,
    AddRow,
    RemoveLastRow,
    ClearRows,
    /// Proceed without a batch linkage (decision screens).
    SkipLinkage,
    /// Bracketed paste from the terminal.
    PasteText(String),
    Input(char),
    Backspace,
    Resize(u16, u16),
}

use crate::config::{ConfigRow, GameConfig, Operator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Min,
    Max,
    Operator,
}

impl EditorField {
    fn next(self) -> Self {
        match self {
            EditorField::Min => EditorField::Max,
            EditorField::Max => EditorField::Operator,
            EditorField::Operator => EditorField::Min,
        }
    }

    fn prev(self) -> Self {
        match self {
            EditorField::Min => EditorField::Operator,
            EditorField::Max => EditorField::Min,
            EditorField::Operator => EditorField::Max,
        }
    }
}

/// Working copy of the config rows while the editor is open. Nothing here is
/// validated; that happens when the rows are saved.
#[derive(Debug, Clone)]
pub struct ConfigEditor {
    rows: Vec<ConfigRow>,
    pub selected_row: usize,
    pub selected_field: EditorField,
    pub error: Option<String>,
}

impl ConfigEditor {
    pub fn open(config: &GameConfig) -> Self {
        Self {
            rows: config.rows().to_vec(),
            selected_row: 0,
            selected_field: EditorField::Min,
            error: None,
        }
    }

    pub fn rows(&self) -> &[ConfigRow] {
        &self.rows
    }

    pub fn select_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        if self.selected_row + 1 < self.rows.len() {
            self.selected_row += 1;
        }
    }

    pub fn next_field(&mut self) {
        self.selected_field = self.selected_field.next();
    }

    pub fn prev_field(&mut self) {
        self.selected_field = self.selected_field.prev();
    }

    fn is_last(&self, row: usize) -> bool {
        row + 1 == self.rows.len()
    }

    /// Nudges the selected number, or cycles the operator. The last row's `=`
    /// is fixed.
    pub fn adjust(&mut self, delta: i64) {
        let is_last = self.is_last(self.selected_row);
        let field = self.selected_field;
        let Some(row) = self.rows.get_mut(self.selected_row) else {
            return;
        };
        match field {
            EditorField::Min => row.min = row.min.saturating_add(delta),
            EditorField::Max => row.max = row.max.saturating_add(delta),
            EditorField::Operator if !is_last => row.operator = row.operator.cycle(),
            EditorField::Operator => {}
        }
        self.error = None;
    }

    /// Inserts a copy of the selected row in front of it, keeping `=` last.
    pub fn add_row(&mut self) {
        let Some(mut row) = self.rows.get(self.selected_row).copied() else {
            self.rows.push(ConfigRow::new(1, 10, Operator::Equals));
            return;
        };
        if row.operator == Operator::Equals {
            row.operator = Operator::Add;
        }
        let at = self.selected_row.min(self.rows.len() - 1);
        self.rows.insert(at, row);
        self.selected_row = at;
        self.error = None;
    }

    /// Removes the selected row. Removing the last row hands its `=` to the
    /// new last row.
    pub fn remove_row(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.rows.remove(self.selected_row);
        if let Some(last) = self.rows.last_mut() {
            last.operator = Operator::Equals;
        }
        self.selected_row = self.selected_row.min(self.rows.len().saturating_sub(1));
        self.error = None;
    }

    pub fn reset_to_default(&mut self) {
        self.rows = GameConfig::default().into_rows();
        self.selected_row = 0;
        self.selected_field = EditorField::Min;
        self.error = None;
    }
}

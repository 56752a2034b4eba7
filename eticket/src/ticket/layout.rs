//! What goes on a ticket page, independent of the output format.

use super::encoder::CodeImage;
use super::payload::TicketRecord;

/// One label/value line of the details box
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailRow {
    /// Left column
    pub label: String,
    /// Right column
    pub value: String,
}

/// Content of a single-page ticket
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketLayout {
    /// Header title
    pub title: String,
    /// Header subtitle (production and holder)
    pub subtitle: String,
    /// Title of the details box
    pub heading: String,
    /// Spettacolo, Data, Posti, Totale, Ordine
    pub rows: Vec<DetailRow>,
    /// Verification code
    pub code: CodeImage,
    /// Text under the code
    pub caption: String,
    /// Fine print
    pub footer: String,
}

impl TicketLayout {
    /// Lays out `record`, printing the date as `date_label`
    #[must_use]
    pub fn for_record(
        record: &TicketRecord,
        production: &str,
        date_label: &str,
        code: CodeImage,
    ) -> Self {
        let row = |label: &str, value: String| DetailRow {
            label: label.to_string(),
            value,
        };

        Self {
            title: "E-TICKET".to_string(),
            subtitle: format!("{production} — {}", record.holder),
            heading: "Dettagli biglietto".to_string(),
            rows: vec![
                row("Spettacolo", record.show.clone()),
                row("Data", date_label.to_string()),
                row("Posti", record.quantity.to_string()),
                row("Totale", record.total.to_string()),
                row("Ordine", record.order_id.to_string()),
            ],
            code,
            caption: "Mostra questo QR all'ingresso.".to_string(),
            footer: format!(
                "Emesso da {} • Uso personale • Non trasferibile senza autorizzazione",
                record.holder
            ),
        }
    }

    /// Value of the row labelled `label`
    #[must_use]
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

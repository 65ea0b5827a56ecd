use anyhow::Result;
use std::io::Write;

use crate::application::CashCardService;
use crate::domain::format_cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Exporter for writing one owner's cards in various formats
pub struct Exporter<'a> {
    service: &'a CashCardService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a CashCardService) -> Self {
        Self { service }
    }

    pub async fn export<W: Write>(
        &self,
        format: ExportFormat,
        owner: &str,
        writer: W,
    ) -> Result<usize> {
        match format {
            ExportFormat::Csv => self.export_csv(owner, writer).await,
            ExportFormat::Json => self.export_json(owner, writer).await,
        }
    }

    /// Export cards to CSV format
    pub async fn export_csv<W: Write>(&self, owner: &str, writer: W) -> Result<usize> {
        let cards = self.service.list_all_cash_cards(owner).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "amount", "owner"])?;

        for card in &cards {
            csv_writer.write_record([
                card.id.map(|id| id.to_string()).unwrap_or_default(),
                format_cents(card.amount),
                card.owner.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(cards.len())
    }

    /// Export cards as a JSON array, in the same shape the HTTP API returns
    pub async fn export_json<W: Write>(&self, owner: &str, mut writer: W) -> Result<usize> {
        let cards = self.service.list_all_cash_cards(owner).await?;
        serde_json::to_writer_pretty(&mut writer, &cards)?;
        writeln!(writer)?;
        Ok(cards.len())
    }
}

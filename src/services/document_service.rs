// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, GuestRepository, HotelRepository},
    services::folio_service::FolioService,
};

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

// Percent-encoding mínimo para os parâmetros da URI UPI.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b'@') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// URI lida pelos apps UPI: `upi://pay?pa=<vpa>&pn=<nome>&am=<valor>&cu=<moeda>`.
pub fn upi_payment_uri(upi_id: &str, payee_name: &str, amount: Decimal, currency: &str) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={:.2}&cu={}",
        encode_component(upi_id),
        encode_component(payee_name),
        amount,
        encode_component(currency)
    )
}

#[derive(Clone)]
pub struct DocumentService {
    hotel_repo: HotelRepository,
    booking_repo: BookingRepository,
    guest_repo: GuestRepository,
    folio_service: FolioService,
    fonts_dir: String,
    currency: String,
}

impl DocumentService {
    pub fn new(
        hotel_repo: HotelRepository,
        booking_repo: BookingRepository,
        guest_repo: GuestRepository,
        folio_service: FolioService,
        fonts_dir: String,
        currency: String,
    ) -> Self {
        Self { hotel_repo, booking_repo, guest_repo, folio_service, fonts_dir, currency }
    }

    /// Fatura do folio em PDF.
    pub async fn generate_invoice_pdf(&self, hotel_id: Uuid, booking_id: Uuid) -> Result<Vec<u8>, AppError> {
        // 1. Busca os dados
        let hotel = self
            .hotel_repo
            .find_by_id(hotel_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("hotel".into()))?;
        let booking = self
            .booking_repo
            .find_by_id(hotel_id, booking_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("booking".into()))?;
        let guest = self.guest_repo.find_by_id(hotel_id, booking.guest_id).await?;
        let detail = self.folio_service.get_detail(hotel_id, booking_id).await?;
        let folio = &detail.folio;

        // 2. Configura o PDF
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None).map_err(|e| {
            tracing::error!("Fonte não encontrada em {}: {}", self.fonts_dir, e);
            pdf_error(e)
        })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Fatura {}", booking.id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(elements::Paragraph::new(hotel.name.clone()).styled(style::Style::new().bold().with_font_size(18)));
        if let Some(gstin) = hotel
            .legal_info
            .as_ref()
            .and_then(|info| info.get("gstin"))
            .and_then(|v| v.as_str())
        {
            doc.push(elements::Paragraph::new(format!("GSTIN: {gstin}")).styled(style::Style::new().with_font_size(10)));
        }

        doc.push(elements::Break::new(1.5));
        doc.push(elements::Paragraph::new("INVOICE").styled(style::Style::new().bold().with_font_size(14)));
        doc.push(elements::Paragraph::new(format!("Booking: {}", booking.id)));
        doc.push(elements::Paragraph::new(format!(
            "Stay: {} - {}",
            booking.check_in_date.format("%d/%m/%Y"),
            booking.check_out_date.format("%d/%m/%Y")
        )));
        match &guest {
            Some(g) => doc.push(elements::Paragraph::new(format!("Guest: {} ({})", g.full_name, g.phone))),
            None => doc.push(elements::Paragraph::new("Guest: -")),
        }

        doc.push(elements::Break::new(2));

        // --- LANÇAMENTOS ---
        // Pesos das colunas: Descrição (4), Qtd (1), Unitário (2), Total (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Description").styled(style_bold))
            .element(elements::Paragraph::new("Qty").styled(style_bold))
            .element(elements::Paragraph::new("Unit").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .map_err(pdf_error)?;

        for charge in &detail.charges {
            table
                .row()
                .element(elements::Paragraph::new(charge.description.clone()))
                .element(elements::Paragraph::new(charge.quantity.to_string()))
                .element(elements::Paragraph::new(format!("{} {:.2}", self.currency, charge.amount)))
                .element(elements::Paragraph::new(format!(
                    "{} {:.2}",
                    self.currency,
                    charge.amount * Decimal::from(charge.quantity)
                )))
                .push()
                .map_err(pdf_error)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAIS ---
        for (label, value, bold) in [
            ("Charges", folio.total_charges, false),
            ("Payments", folio.total_payments, false),
            ("Balance due", folio.balance, true),
        ] {
            let mut paragraph = elements::Paragraph::new(format!("{label}: {} {:.2}", self.currency, value));
            paragraph.set_alignment(genpdf::Alignment::Right);
            let styled = if bold {
                paragraph.styled(style::Style::new().bold().with_font_size(12))
            } else {
                paragraph.styled(style::Style::new())
            };
            doc.push(styled);
        }

        doc.push(elements::Break::new(2));

        // --- PAGAMENTO VIA UPI (QR CODE) ---
        if let Some(upi_id) = hotel.upi_id.as_deref().filter(|_| folio.balance > Decimal::ZERO) {
            doc.push(elements::Paragraph::new("PAY VIA UPI").styled(style::Style::new().bold().with_font_size(12)));
            doc.push(elements::Paragraph::new(format!("UPI ID: {upi_id}")));
            doc.push(elements::Break::new(1));

            let uri = upi_payment_uri(upi_id, &hotel.name, folio.balance, &self.currency);
            let code = QrCode::new(uri.as_bytes()).map_err(pdf_error)?;

            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

            let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
                .map_err(pdf_error)?
                .with_scale(genpdf::Scale::new(0.5, 0.5));

            doc.push(pdf_image);
        }

        // --- RODAPÉ ---
        if let Some(address) = hotel.address.as_ref().and_then(|a| a.get("line1")).and_then(|v| v.as_str()) {
            doc.push(elements::Break::new(2));
            doc.push(elements::Paragraph::new(address.to_string()).styled(style::Style::new().italic().with_font_size(8)));
        }

        // 3. Renderiza para memória
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        tracing::info!("🧾 Fatura da reserva {} gerada ({} bytes)", booking.id, buffer.len());
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upi_uri_encodes_payee_and_formats_amount() {
        let uri = upi_payment_uri("aurora@okhdfc", "Hotel Aurora & Spa", Decimal::new(6005, 1), "INR");
        assert_eq!(uri, "upi://pay?pa=aurora@okhdfc&pn=Hotel%20Aurora%20%26%20Spa&am=600.50&cu=INR");
    }
}

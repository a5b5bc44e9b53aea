//! Background notification worker.
//!
//! All email leaves the request path through a single unbounded
//! channel. The worker drains jobs one at a time; delivery failures
//! are logged and swallowed so a broken mailer can never fail a
//! checkout or a catalog write.
//!
//! ```text
//! handlers ──► Notifier::enqueue ──► mpsc ──► worker ──► Mailer
//! (HTTP)        (fire-and-forget)                         (trait)
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use bazaar_core::{BillWithItems, Money, Product};
use bazaar_db::Database;

/// A unit of outbound notification work.
#[derive(Debug)]
pub enum NotificationJob {
    /// Send a purchase receipt to the customer who checked out.
    BillReceipt {
        email: String,
        bill: BillWithItems,
    },

    /// Scan the catalog and alert employees about low-stock products.
    LowStockScan,

    /// Send employees the daily inventory summary.
    DailySummary,
}

/// An email ready for delivery.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery backend seam.
///
/// Production wires an SMTP implementation here; tests and local
/// development use [`LogMailer`].
pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> anyhow::Result<()>;
}

/// Mailer that writes deliveries to the log instead of the network.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &OutboundEmail) -> anyhow::Result<()> {
        info!(
            to = ?email.to,
            subject = %email.subject,
            bytes = email.body.len(),
            "Email delivered (log mailer)"
        );
        Ok(())
    }
}

/// Handle used by request handlers to enqueue jobs.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<NotificationJob>,
}

impl Notifier {
    /// Enqueue a job. Never blocks and never fails the caller: if the
    /// worker is gone the job is dropped with a log line.
    pub fn enqueue(&self, job: NotificationJob) {
        if self.tx.send(job).is_err() {
            warn!("Notification worker is gone, dropping job");
        }
    }
}

/// Spawn the notification worker. Returns the enqueue handle and the
/// worker's join handle (kept alive for the life of the server).
pub fn spawn_notifier(db: Database, mailer: Arc<dyn Mailer>) -> (Notifier, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        info!("Notification worker started");

        while let Some(job) = rx.recv().await {
            if let Err(err) = process_job(&db, mailer.as_ref(), job).await {
                warn!(?err, "Notification job failed");
            }
        }

        info!("Notification worker stopped");
    });

    (Notifier { tx }, handle)
}

async fn process_job(db: &Database, mailer: &dyn Mailer, job: NotificationJob) -> anyhow::Result<()> {
    match job {
        NotificationJob::BillReceipt { email, bill } => {
            debug!(bill_id = %bill.bill.id, "Sending bill receipt");

            let outbound = OutboundEmail {
                to: vec![email],
                subject: format!("Your receipt #{}", bill.bill.id),
                body: render_receipt(&bill),
            };
            mailer.send(&outbound)
        }

        NotificationJob::LowStockScan => {
            let low = db.products().list_low_stock().await?;
            if low.is_empty() {
                debug!("Low-stock scan: nothing to report");
                return Ok(());
            }

            let recipients = db.users().list_employee_emails().await?;
            if recipients.is_empty() {
                warn!("Low-stock alert has no employee recipients");
                return Ok(());
            }

            let outbound = OutboundEmail {
                to: recipients,
                subject: format!("Low stock alert: {} product(s)", low.len()),
                body: render_stock_report("The following products are running low:", &low),
            };
            mailer.send(&outbound)
        }

        NotificationJob::DailySummary => {
            let products = db.products().list().await?;
            let recipients = db.users().list_employee_emails().await?;
            if recipients.is_empty() {
                warn!("Daily summary has no employee recipients");
                return Ok(());
            }

            let outbound = OutboundEmail {
                to: recipients,
                subject: "Daily inventory summary".to_string(),
                body: render_stock_report("Current inventory levels:", &products),
            };
            mailer.send(&outbound)
        }
    }
}

/// Render a plain-text receipt from the frozen bill lines.
fn render_receipt(bill: &BillWithItems) -> String {
    let mut out = String::new();
    out.push_str(&format!("Receipt #{}\n", bill.bill.id));
    out.push_str(&format!(
        "Date: {}\n\n",
        bill.bill.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    for item in &bill.items {
        out.push_str(&format!(
            "{:<30} {:>4} x {:>10} = {:>10}\n",
            item.name_snapshot,
            item.quantity,
            Money::from_cents(item.price_cents).to_string(),
            item.line_total().to_string(),
        ));
    }

    out.push_str(&format!("\nTotal: {}\n", bill.bill.total()));
    out.push_str("Thank you for your purchase!\n");
    out
}

fn render_stock_report(heading: &str, products: &[Product]) -> String {
    let mut out = String::new();
    out.push_str(heading);
    out.push('\n');

    for product in products {
        out.push_str(&format!(
            "{:<30} quantity: {:>6}\n",
            product.name, product.quantity
        ));
    }

    out
}

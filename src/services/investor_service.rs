// ==================== SEED PARTNER ONBOARDING ====================
// A validated application produces two emails: a notification to the firm's
// admin inbox and a confirmation to the applicant.

use crate::{
    config::MailConfig,
    models::InvestorApplication,
    services::mail_service::{Mailer, OutgoingEmail},
    utils::error::{AppError, AppResult},
};

pub const SUCCESS_MESSAGE: &str =
    "Application submitted successfully. You will receive a confirmation email shortly.";
pub const DELIVERY_FAILED_MESSAGE: &str =
    "Application received but there was an error sending confirmation emails. Our team will contact you.";

pub fn html_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn status(flag: bool, yes: &str, no: &str) -> String {
    if flag { yes.to_string() } else { no.to_string() }
}

pub fn admin_notification(
    application: &InvestorApplication,
    config: &MailConfig,
) -> AppResult<OutgoingEmail> {
    let admin = config
        .admin_email
        .clone()
        .ok_or_else(|| AppError::Mail("ADMIN_EMAIL is not set".to_string()))?;

    let html = format!(
        r#"
<h2>New Seed Partner Application</h2>
<p><strong>Applicant Details:</strong></p>
<ul>
  <li><strong>Full Name:</strong> {name}</li>
  <li><strong>PAN Number:</strong> {pan}</li>
  <li><strong>Email:</strong> {email}</li>
  <li><strong>Mobile Number:</strong> {mobile}</li>
  <li><strong>Address:</strong> {address}</li>
</ul>
<p><strong>Confirmation Status:</strong></p>
<ul>
  <li>Structure and Terms Review: {alignment}</li>
  <li>Ready to Proceed: {ready}</li>
  <li>Timeline Acknowledgment: {timelines}</li>
</ul>
<p><strong>Next Steps:</strong></p>
<ol>
  <li>Review applicant details</li>
  <li>Contact applicant within 48 hours</li>
  <li>Send formal documentation if approved</li>
  <li>Confirm capital deployment schedule (March 25, 2025)</li>
</ol>
<hr>
<p><em>This is an automated notification from TheOneAlpha Seed Partner Onboarding System</em></p>
"#,
        name = html_escape(&application.full_name),
        pan = html_escape(&application.pan_number),
        email = html_escape(&application.email),
        mobile = html_escape(&application.mobile_number),
        address = html_escape(&application.address),
        alignment = status(application.alignment_confirm, "Confirmed", "Not Confirmed"),
        ready = status(application.ready_to_proceed, "Yes", "No"),
        timelines = status(application.acknowledge_timelines, "Acknowledged", "Not Acknowledged"),
    );

    Ok(OutgoingEmail {
        from: config.sender(),
        to: admin,
        subject: format!("New Seed Partner Application - {}", application.full_name),
        html,
    })
}

pub fn applicant_confirmation(
    application: &InvestorApplication,
    config: &MailConfig,
) -> OutgoingEmail {
    let html = format!(
        r#"
<h2>Subject: Your Seed Pool Activation – Next Steps &amp; Timeline</h2>

<p>Dear {name},</p>

<p>We are pleased to confirm that you have successfully completed the Seed Partner Onboarding Protocol for <strong>Genesis Series – Pool #001</strong>. Your participation initiates a structured onboarding process, ensuring a smooth transition from formalization to capital deployment.</p>

<h3>Next Steps &amp; Timeline</h3>
<ol>
  <li><strong>Compliance Review</strong> – Your KYC and verification process will be completed by <strong>Monday, March 17, 2025</strong>. This step ensures regulatory compliance before proceeding with formal agreements.</li>

  <li><strong>Seed Pool Finalization</strong> – Formal agreements will be finalized by <strong>Wednesday, March 19, 2025</strong>. This involves signing and structuring commitments required to secure the necessary capital base.</li>

  <li><strong>Prime Lender Approval</strong> – Institutional funding approval will be secured by <strong>Thursday, March 20, 2025</strong>. Once the seed pool is formalized, the approval process for institutional funding is initiated, paving the way for capital extension.</li>

  <li><strong>Terminal Setup</strong> – Systems and infrastructure will be prepared by <strong>Friday, March 21, 2025</strong>. This includes operational readiness, execution mechanisms, and access provisioning.</li>

  <li><strong>Capital Deployment</strong> – By <strong>Friday, March 21, 2025</strong>, once the prime lender approval is secured, the seed fund procurement process will be completed. This enables the activation and extension of capital by the prime lender, ensuring liquidity for strategy execution.</li>

  <li><strong>Operations Begin</strong> – Execution officially starts on <strong>Tuesday, March 25, 2025</strong>. With capital in place and systems fully operational, the strategy transitions into live deployment. Upon capital deployment, you will receive a secure login credential to access your dedicated dashboard. This portal will provide quarterly tracking of performance and strategic execution updates, ensuring you stay up to date throughout the investment cycle.</li>
</ol>

<p>We will provide timely updates at each stage and assist you throughout the process. If you have any questions, feel free to contact us at enquiries@theonealpha.com.</p>

<p>Welcome aboard. We look forward to this journey together.</p>

<p><strong>Best regards</strong>,<br>
<strong>The One Alpha</strong><br>
www.theonealpha.com</p>

<hr>
<p style="font-size: 12px; color: #666;">
  This communication is confidential and intended solely for the addressee. The information contained herein is subject to the terms and conditions outlined in our partnership agreement.
</p>
"#,
        name = html_escape(&application.full_name),
    );

    OutgoingEmail {
        from: config.sender(),
        to: application.email.clone(),
        subject: "TheOneAlpha - Seed Partner Application Received".to_string(),
        html,
    }
}

/// Sends both emails concurrently; fails if either does.
pub async fn send_application_emails(
    mailer: &dyn Mailer,
    config: &MailConfig,
    application: &InvestorApplication,
) -> AppResult<()> {
    let admin_email = admin_notification(application, config)?;
    let applicant_email = applicant_confirmation(application, config);

    futures::future::try_join(mailer.send(admin_email), mailer.send(applicant_email)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_submission;
    use crate::services::mail_service::{testing::RecordingMailer, DisabledMailer};

    fn mail_config() -> MailConfig {
        MailConfig {
            from: "desk@firm.com".into(),
            display_name: "TheOneAlpha".into(),
            admin_email: Some("admin@firm.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(html_escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_admin_notification_content() {
        let mut app = sample_submission().validate().unwrap();
        app.full_name = "<script>x</script>".into();
        let email = admin_notification(&app, &mail_config()).unwrap();

        assert_eq!(email.to, "admin@firm.com");
        assert_eq!(email.from, "\"TheOneAlpha\" <desk@firm.com>");
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("Ready to Proceed: Yes"));
        assert!(email.html.contains("Timeline Acknowledgment: Not Acknowledged"));
        assert!(email.html.contains("Confirm capital deployment schedule (March 25, 2025)"));
        assert!(email.html.contains("TheOneAlpha Seed Partner Onboarding System"));
    }

    #[test]
    fn test_applicant_confirmation_content() {
        let mut app = sample_submission().validate().unwrap();
        app.full_name = "Asha & Co".into();
        let email = applicant_confirmation(&app, &mail_config());

        assert_eq!(email.to, "asha@example.com");
        assert_eq!(email.subject, "TheOneAlpha - Seed Partner Application Received");
        assert!(email.html.contains("Dear Asha &amp; Co,"));
        assert!(email.html.contains("Subject: Your Seed Pool Activation"));
        assert!(email.html.contains("Genesis Series – Pool #001"));
        assert!(email.html.contains("outlined in our partnership agreement"));
    }

    #[test]
    fn test_admin_notification_needs_recipient() {
        let app = sample_submission().validate().unwrap();
        let config = MailConfig {
            admin_email: None,
            ..mail_config()
        };
        assert!(admin_notification(&app, &config).is_err());
    }

    #[actix_web::test]
    async fn test_sends_two_emails() {
        let app = sample_submission().validate().unwrap();
        let mailer = RecordingMailer::default();
        send_application_emails(&mailer, &mail_config(), &app).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        let recipients: Vec<&str> = sent.iter().map(|e| e.to.as_str()).collect();
        assert!(recipients.contains(&"admin@firm.com"));
        assert!(recipients.contains(&"asha@example.com"));
    }

    #[actix_web::test]
    async fn test_delivery_failure_is_reported() {
        let app = sample_submission().validate().unwrap();
        let result = send_application_emails(&DisabledMailer, &mail_config(), &app).await;
        assert!(matches!(result, Err(AppError::Mail(_))));
    }
}

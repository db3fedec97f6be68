//! CSV attachments, one writer per report.

use analytics::PerformanceRow;
use analyzer::TeamRanks;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Local;
use database::reports::contact::ContactRow;
use database::reports::enrollment::EnrollmentRow;
use database::reports::lead::LeadRow;
use database::reports::marketing::MarketingRow;
use database::reports::negotiator::NegotiatorRow;
use database::reports::program_completion::ProgramCompletionRow;
use database::reports::terminal::TerminalRow;
use database::reports::tranche::TrancheRow;

use crate::error::AppError;
use crate::format::{currency, date, decimal, float, int, ratio, text, whole};

/// Wraps finished CSV bytes as a download named `<prefix>_<YYYYMMDD_HHMMSS>.csv`.
pub fn csv_response(prefix: &str, body: Vec<u8>) -> Response {
    let filename = format!("{prefix}_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
    let disposition = format!("attachment; filename=\"{filename}\"");
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

fn table<R>(headers: &[&str], rows: &[R], record: impl Fn(&R) -> Vec<String>) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(record(row))?;
    }
    writer.into_inner().map_err(|e| AppError::Export(e.to_string()))
}

pub fn leads(rows: &[LeadRow]) -> Result<Vec<u8>, AppError> {
    let headers = [
        "Created Date", "Assigned Date", "CID", "Campaign", "Data Source", "Agent", "Client", "Phone",
        "Email", "State", "Stage", "Status", "Lead Debt Amount", "Debt Tier", "Enrolled Debt",
        "Submitted Date", "Welcome Call Date", "Payment Date", "Cancel Date", "NSF Date",
    ];
    table(&headers, rows, |r| {
        vec![
            date(r.created_date),
            date(r.assigned_date),
            r.llg_id.to_string(),
            text(r.campaign.as_deref()),
            text(r.data_source.as_deref()),
            text(r.agent.as_deref()),
            text(r.client.as_deref()),
            text(r.phone.as_deref()),
            text(r.email.as_deref()),
            text(r.state.as_deref()),
            text(r.stage.as_deref()),
            text(r.status.as_deref()),
            decimal(r.debt_amount, 2),
            int(r.debt_tier),
            decimal(Some(r.enrolled_debt), 2),
            date(r.submitted_date),
            date(r.welcome_call_date),
            date(r.payment_date),
            date(r.cancel_date),
            date(r.nsf_date),
        ]
    })
}

pub fn contacts(rows: &[ContactRow]) -> Result<Vec<u8>, AppError> {
    let headers = [
        "Created Date", "Assigned Date", "CID", "External ID", "Campaign", "Data Source", "Agent",
        "Client", "Phone", "Email", "Stage", "Status", "Debt Enrolled", "Address", "City", "State",
        "Zip", "Credit Score",
    ];
    table(&headers, rows, |r| {
        vec![
            date(r.created_date),
            date(r.assigned_date),
            r.llg_id.to_string(),
            text(r.external_id.as_deref()),
            text(r.campaign.as_deref()),
            text(r.data_source.as_deref()),
            text(r.agent.as_deref()),
            text(r.client.as_deref()),
            text(r.phone.as_deref()),
            text(r.email.as_deref()),
            text(r.stage.as_deref()),
            text(r.status.as_deref()),
            currency(r.debt_enrolled),
            r.address(),
            text(r.city.as_deref()),
            text(r.state.as_deref()),
            text(r.zip.as_deref()),
            int(r.credit_score),
        ]
    })
}

pub fn enrollments(rows: &[EnrollmentRow]) -> Result<Vec<u8>, AppError> {
    let headers = [
        "PK", "Drop Name", "CID", "Category", "State", "Agent", "Negotiator", "Client", "Debt Amount",
        "Welcome Call Date", "Submitted Date", "Payment Date 1", "Payment Date 2",
        "First Payment Cleared Date", "Cancel Date", "NSF Date", "Payments",
    ];
    table(&headers, rows, |r| {
        vec![
            r.pk.to_string(),
            text(r.drop_name.as_deref()),
            r.llg_id.to_string(),
            text(r.category.as_deref()),
            text(r.state.as_deref()),
            text(r.agent.as_deref()),
            text(r.negotiator.as_deref()),
            text(r.client.as_deref()),
            currency(r.debt_amount),
            date(r.welcome_call_date),
            date(r.submitted_date),
            date(r.payment_date_1),
            date(r.payment_date_2),
            date(r.first_payment_cleared_date),
            date(r.cancel_date),
            date(r.nsf_date),
            whole(r.payments),
        ]
    })
}

/// Cancel and NSF exports share one layout.
pub fn terminal(rows: &[TerminalRow]) -> Result<Vec<u8>, AppError> {
    let headers = [
        "Drop Name", "CID", "State", "Agent", "Client", "Debt Amount", "Welcome Call Date",
        "Payment Date 1", "Payment Date 2", "Cancel Date", "NSF Date", "Payments", "Negotiator",
        "Negotiator Assigned Date", "First Payment Date", "First Payment Cleared Date",
        "Enrolled Debt Accounts", "Enrollment Status", "Enrollment Plan", "Program Payment",
        "Program Length", "First Payment Status", "Submitted Date",
    ];
    table(&headers, rows, |r| {
        vec![
            text(r.drop_name.as_deref()),
            r.llg_id.to_string(),
            text(r.state.as_deref()),
            text(r.agent.as_deref()),
            text(r.client.as_deref()),
            currency(r.debt_amount),
            date(r.welcome_call_date),
            date(r.payment_date_1),
            date(r.payment_date_2),
            date(r.cancel_date),
            date(r.nsf_date),
            currency(r.payments),
            text(r.negotiator.as_deref()),
            date(r.negotiator_assigned_date),
            date(r.first_payment_date),
            date(r.first_payment_cleared_date),
            int(r.enrolled_debt_accounts),
            text(r.enrollment_status.as_deref()),
            text(r.enrollment_plan.as_deref()),
            currency(r.program_payment),
            int(r.program_length),
            text(r.first_payment_status.as_deref()),
            date(r.submitted_date),
        ]
    })
}

pub fn marketing(rows: &[MarketingRow]) -> Result<Vec<u8>, AppError> {
    let headers = [
        "PK", "Drop Name", "Debt Tier", "Drop Type", "Vendor", "Data Type", "Mail Style", "Send Date",
        "Amount Dropped", "Mail Invoice Number", "Mail Drop Cost", "Per Piece Mail Drop Cost",
        "Data Invoice Number", "Data Drop Cost", "Per Piece Data Drop Cost", "Total Drop Cost",
        "Per Piece Total Drop Cost", "Calls", "Language", "Drop Name Sequential",
    ];
    table(&headers, rows, |r| {
        vec![
            r.pk.to_string(),
            text(r.drop_name.as_deref()),
            text(r.debt_tier.as_deref()),
            text(r.drop_type.as_deref()),
            text(r.vendor.as_deref()),
            text(r.data_type.as_deref()),
            text(r.mail_style.as_deref()),
            date(r.send_date),
            int(r.amount_dropped),
            text(r.mail_invoice_number.as_deref()),
            currency(Some(r.mail_drop_cost)),
            ratio(Some(r.costs.per_piece_mail_cost)),
            text(r.data_invoice_number.as_deref()),
            currency(Some(r.data_drop_cost)),
            ratio(Some(r.costs.per_piece_data_cost)),
            currency(Some(r.costs.total_drop_cost)),
            ratio(Some(r.costs.per_piece_total_cost)),
            int(r.calls),
            text(r.language.as_deref()),
            text(r.drop_name_sequential.as_deref()),
        ]
    })
}

pub fn program_completion(rows: &[ProgramCompletionRow]) -> Result<Vec<u8>, AppError> {
    let headers = [
        "CID", "Client", "Welcome Call Date", "Total Settlement Amounts Accepted",
        "Original Debt Amount Settled", "Enrolled Debt", "Settlement Rate", "Program Completion",
        "Latest Settlement Date",
    ];
    table(&headers, rows, |r| {
        vec![
            r.llg_id.to_string(),
            text(r.client.as_deref()),
            date(r.welcome_call_date),
            currency(Some(r.total_settlement_amounts_accepted)),
            currency(Some(r.original_debt_amount_settled)),
            decimal(r.enrolled_debt, 2),
            ratio(Some(r.settlement_rate)),
            ratio(Some(r.program_completion)),
            date(r.latest_settlement_date),
        ]
    })
}

pub fn tranches(rows: &[TrancheRow]) -> Result<Vec<u8>, AppError> {
    let headers = [
        "Tranche", "Payment Date", "Report Date", "Total Debt", "LDR Count", "PLAW Count",
        "Progress Count", "Total Count", "Payment", "Sold Debt (Lookback)", "8% of Lookback",
        "EPF All", "EPF Pending", "EPF Amount", "EPF Dist Amount", "EPF Total (Q)",
        "Payment + 10% (N)", "R = min(Q,N)", "S = max(N-Q,0)", "T = max(Q-N,0)", "U = R/N",
        "Flip Date",
    ];
    table(&headers, rows, |r| {
        let w = &r.waterfall;
        vec![
            r.tranche.to_string(),
            date(r.payment_date),
            date(r.report_date),
            decimal(r.total_debt, 2),
            int(r.count_ldr),
            int(r.count_plaw),
            int(r.count_progress),
            int(r.count_total),
            decimal(r.payment, 2),
            decimal(r.sold_debt_lookback, 2),
            decimal(Some(w.k), 2),
            decimal(r.epf_all, 2),
            decimal(r.epf_pending, 2),
            decimal(r.epf_amount, 2),
            decimal(r.epfd_amount, 2),
            decimal(Some(w.q), 2),
            decimal(Some(w.n), 2),
            decimal(Some(w.r), 2),
            decimal(Some(w.s), 2),
            decimal(Some(w.t), 2),
            ratio(Some(w.u)),
            date(r.flip_date),
        ]
    })
}

pub fn negotiators(rows: &[NegotiatorRow]) -> Result<Vec<u8>, AppError> {
    let headers = [
        "LLG-ID", "Contact Name", "Enrollment Status", "Assignment Status", "Negotiator",
        "Assigned Date", "Agent", "NGO", "Debt ID", "Debt Amount", "Custodial Balance",
        "Debt / Balance %", "Payments", "Debt Tier", "Creditor", "Collection Company",
        "Creditor Group", "Follow Up Date", "Ready To Settle Date", "Account Not Ready Date",
        "Account Not Ready Reason", "Last Payment Date", "Settlement Date", "Settlements",
        "Days Since Last Activity", "WCC Date", "Balance Two Months Ago", "Balance Last Month",
        "Balance Current", "Send POA",
    ];
    table(&headers, rows, |r| {
        vec![
            r.cid.clone(),
            text(r.contact_name.as_deref()),
            text(r.enrollment_status.as_deref()),
            text(r.assignment_status.as_deref()),
            text(r.negotiator.as_deref()),
            date(r.negotiator_assigned_date),
            text(r.agent.as_deref()),
            text(r.ngo.as_deref()),
            int(r.debt_id),
            currency(r.debt_amount),
            currency(r.balance),
            ratio(r.debt_balance_ratio),
            currency(r.payments),
            int(r.debt_tier),
            text(r.creditor.as_deref()),
            text(r.collection_company.as_deref()),
            text(r.creditor_group.as_deref()),
            date(r.follow_up_date),
            date(r.ready_to_settle_date),
            date(r.account_not_ready_date),
            text(r.account_not_ready_reason.as_deref()),
            date(r.last_payment_date),
            date(r.settlement_date),
            r.settlements.to_string(),
            int(r.days_since_activity),
            date(r.wcc_date),
            currency(r.balance_two_months_ago),
            currency(r.balance_last_month),
            currency(r.balance),
            r.send_poa.to_string(),
        ]
    })
}

const TEAM_RANK_HEADERS: [&str; 13] = [
    "Team", "Agent", "Contacts", "WCC", "Cancels", "NSFs", "Enrolled Debt", "Net", "Ratio",
    "Rank Ratio", "Rank WCC", "Rank Debt", "Score",
];

fn performance_counts(r: &PerformanceRow) -> Vec<String> {
    vec![
        r.contacts.to_string(),
        r.wcc.to_string(),
        r.cancels.to_string(),
        r.nsfs.to_string(),
        decimal(Some(r.enrolled_debt), 2),
        r.net.to_string(),
        float(r.ratio, 4),
    ]
}

fn ranked(r: &PerformanceRow) -> Vec<String> {
    let mut record = vec![r.team.clone(), r.agent.clone()];
    record.extend(performance_counts(r));
    record.extend([int(r.rank_ratio), int(r.rank_wcc), int(r.rank_debt), float(r.score, 2)]);
    record
}

/// Agents, then a `Teams` section, then the `Company-Wide` row. Section
/// markers are single-cell records.
pub fn team_ranks(ranks: &TeamRanks) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record(TEAM_RANK_HEADERS)?;
    for row in &ranks.agents {
        writer.write_record(ranked(row))?;
    }

    writer.write_record([""])?;
    writer.write_record(["Teams"])?;
    for row in &ranks.teams {
        writer.write_record(ranked(row))?;
    }

    writer.write_record([""])?;
    writer.write_record(["Company-Wide"])?;
    let company = &ranks.company;
    let mut record = vec![company.team.clone(), company.agent.clone()];
    record.extend(performance_counts(company));
    record.extend(std::iter::repeat_n(String::new(), 4));
    writer.write_record(record)?;

    writer.into_inner().map_err(|e| AppError::Export(e.to_string()))
}

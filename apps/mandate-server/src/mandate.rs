// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # NACH Mandate Model
//!
//! The debit mandate handed to the gateway, plus the NPCI code lists used
//! by the onboarding form.
//!
//! Field names follow the NACH message vocabulary (`consRefNo`,
//! `colltnAmt`, `frqcy`, ...) because the JSON form of [`Mandate`] is what
//! gets encrypted and posted to the gateway.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation failures while building a mandate.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MandateError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("final collection date {final_date} is before first collection date {first_date}")]
    DateOrder {
        first_date: NaiveDate,
        final_date: NaiveDate,
    },
}

impl MandateError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Code Lists
// =============================================================================

/// Collection frequency, as NPCI frequency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// As and when presented
    #[serde(rename = "ADHO")]
    Adhoc,
    #[serde(rename = "INDA")]
    IntraDay,
    #[serde(rename = "DAIL")]
    Daily,
    #[serde(rename = "WEEK")]
    Weekly,
    #[serde(rename = "MNTH")]
    Monthly,
    #[serde(rename = "BIMN")]
    BiMonthly,
    #[serde(rename = "QURT")]
    Quarterly,
    /// Half-yearly
    #[serde(rename = "MIAN")]
    SemiAnnual,
    #[serde(rename = "YEAR")]
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 9] = [
        Frequency::Adhoc,
        Frequency::IntraDay,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::BiMonthly,
        Frequency::Quarterly,
        Frequency::SemiAnnual,
        Frequency::Yearly,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Frequency::Adhoc => "ADHO",
            Frequency::IntraDay => "INDA",
            Frequency::Daily => "DAIL",
            Frequency::Weekly => "WEEK",
            Frequency::Monthly => "MNTH",
            Frequency::BiMonthly => "BIMN",
            Frequency::Quarterly => "QURT",
            Frequency::SemiAnnual => "MIAN",
            Frequency::Yearly => "YEAR",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Adhoc => "As and when presented",
            Frequency::IntraDay => "Intra-day",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::BiMonthly => "Bi-monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::SemiAnnual => "Half-yearly",
            Frequency::Yearly => "Yearly",
        }
    }

    /// Ordered `(code, label)` pairs for the frequency select box.
    pub fn options() -> Vec<(&'static str, &'static str)> {
        Self::ALL.iter().map(|f| (f.code(), f.label())).collect()
    }
}

impl FromStr for Frequency {
    type Err = MandateError;

    /// Codes are matched exactly; `mnth` is not `MNTH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.code() == s)
            .ok_or_else(|| MandateError::invalid("frqcy", format!("unknown frequency code '{s}'")))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Debtor bank account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "SAVINGS")]
    Savings,
    #[serde(rename = "CURRENT")]
    Current,
    #[serde(rename = "CC")]
    CashCredit,
    #[serde(rename = "OTHER")]
    Other,
}

impl AccountType {
    pub const ALL: [AccountType; 4] = [
        AccountType::Savings,
        AccountType::Current,
        AccountType::CashCredit,
        AccountType::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            AccountType::Savings => "SAVINGS",
            AccountType::Current => "CURRENT",
            AccountType::CashCredit => "CC",
            AccountType::Other => "OTHER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccountType::Savings => "Savings",
            AccountType::Current => "Current",
            AccountType::CashCredit => "Cash Credit",
            AccountType::Other => "Other",
        }
    }

    /// Ordered `(code, label)` pairs for the account type select box.
    pub fn options() -> Vec<(&'static str, &'static str)> {
        Self::ALL.iter().map(|a| (a.code(), a.label())).collect()
    }
}

impl FromStr for AccountType {
    type Err = MandateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.code() == s)
            .ok_or_else(|| {
                MandateError::invalid("dbtrAccTp", format!("unknown account type '{s}'"))
            })
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Mandate
// =============================================================================

/// A validated NACH debit mandate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Mandate {
    pub utility_code: String,
    pub schm_nm: String,
    pub cons_ref_no: String,
    pub source_reference_number: String,
    pub colltn_amt: Decimal,
    pub frqcy: Frequency,
    pub frst_colltn_dt: NaiveDate,
    pub fnl_colltn_dt: NaiveDate,
    pub dbtr_nm: String,
    pub mobile: String,
    pub dbtr_acc_no: String,
    pub dbtr_acc_tp: AccountType,
    pub bnk_id: String,
}

impl Mandate {
    pub fn builder() -> MandateBuilder {
        MandateBuilder::default()
    }
}

/// Fluent builder for [`Mandate`]; all checks run in [`MandateBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct MandateBuilder {
    utility_code: Option<String>,
    schm_nm: Option<String>,
    cons_ref_no: Option<String>,
    source_reference_number: Option<String>,
    colltn_amt: Option<Decimal>,
    frqcy: Option<Frequency>,
    frst_colltn_dt: Option<NaiveDate>,
    fnl_colltn_dt: Option<NaiveDate>,
    dbtr_nm: Option<String>,
    mobile: Option<String>,
    dbtr_acc_no: Option<String>,
    dbtr_acc_tp: Option<AccountType>,
    bnk_id: Option<String>,
}

impl MandateBuilder {
    pub fn utility_code(mut self, value: impl Into<String>) -> Self {
        self.utility_code = Some(value.into());
        self
    }

    pub fn schm_nm(mut self, value: impl Into<String>) -> Self {
        self.schm_nm = Some(value.into());
        self
    }

    pub fn cons_ref_no(mut self, value: impl Into<String>) -> Self {
        self.cons_ref_no = Some(value.into());
        self
    }

    pub fn source_reference_number(mut self, value: impl Into<String>) -> Self {
        self.source_reference_number = Some(value.into());
        self
    }

    pub fn colltn_amt(mut self, value: Decimal) -> Self {
        self.colltn_amt = Some(value);
        self
    }

    pub fn frqcy(mut self, value: Frequency) -> Self {
        self.frqcy = Some(value);
        self
    }

    pub fn frst_colltn_dt(mut self, value: NaiveDate) -> Self {
        self.frst_colltn_dt = Some(value);
        self
    }

    pub fn fnl_colltn_dt(mut self, value: NaiveDate) -> Self {
        self.fnl_colltn_dt = Some(value);
        self
    }

    pub fn dbtr_nm(mut self, value: impl Into<String>) -> Self {
        self.dbtr_nm = Some(value.into());
        self
    }

    pub fn mobile(mut self, value: impl Into<String>) -> Self {
        self.mobile = Some(value.into());
        self
    }

    pub fn dbtr_acc_no(mut self, value: impl Into<String>) -> Self {
        self.dbtr_acc_no = Some(value.into());
        self
    }

    pub fn dbtr_acc_tp(mut self, value: AccountType) -> Self {
        self.dbtr_acc_tp = Some(value);
        self
    }

    pub fn bnk_id(mut self, value: impl Into<String>) -> Self {
        self.bnk_id = Some(value.into());
        self
    }

    /// Validate and produce the mandate.
    ///
    /// Text fields are trimmed and must be non-blank, the amount must be
    /// positive (rounded to paise), the final collection date must not
    /// precede the first, and the mobile number must be ten digits.
    pub fn build(self) -> Result<Mandate, MandateError> {
        let mut colltn_amt = self
            .colltn_amt
            .ok_or(MandateError::MissingField("colltnAmt"))?
            .round_dp(2);
        colltn_amt.rescale(2);
        if colltn_amt <= Decimal::ZERO {
            return Err(MandateError::invalid("colltnAmt", "must be greater than zero"));
        }

        let frst_colltn_dt = self
            .frst_colltn_dt
            .ok_or(MandateError::MissingField("frstColltnDt"))?;
        let fnl_colltn_dt = self
            .fnl_colltn_dt
            .ok_or(MandateError::MissingField("fnlColltnDt"))?;
        if fnl_colltn_dt < frst_colltn_dt {
            return Err(MandateError::DateOrder {
                first_date: frst_colltn_dt,
                final_date: fnl_colltn_dt,
            });
        }

        let mobile = required_text(self.mobile, "mobile")?;
        if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
            return Err(MandateError::invalid("mobile", "must be 10 digits"));
        }

        Ok(Mandate {
            utility_code: required_text(self.utility_code, "utilityCode")?,
            schm_nm: required_text(self.schm_nm, "schmNm")?,
            cons_ref_no: required_text(self.cons_ref_no, "consRefNo")?,
            source_reference_number: required_text(
                self.source_reference_number,
                "sourceReferenceNumber",
            )?,
            colltn_amt,
            frqcy: self.frqcy.ok_or(MandateError::MissingField("frqcy"))?,
            frst_colltn_dt,
            fnl_colltn_dt,
            dbtr_nm: required_text(self.dbtr_nm, "dbtrNm")?,
            mobile,
            dbtr_acc_no: required_text(self.dbtr_acc_no, "dbtrAccNo")?,
            dbtr_acc_tp: self
                .dbtr_acc_tp
                .ok_or(MandateError::MissingField("dbtrAccTp"))?,
            bnk_id: required_text(self.bnk_id, "bnkId")?,
        })
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, MandateError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(MandateError::MissingField(field))
}

// =============================================================================
// Submitted Form
// =============================================================================

/// Mandate fields exactly as posted by the onboarding form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MandateForm {
    /// Consumer reference number (loan or policy number).
    pub consumer_ref_number: String,
    /// Merchant-side reference used to look the mandate up later.
    pub reference_number: String,
    /// Collection amount, decimal string (e.g. "1500.00").
    pub amount: String,
    /// NPCI frequency code (e.g. "MNTH").
    pub frqcy: String,
    /// First collection date, `YYYY-MM-DD`.
    pub first_collection_date: String,
    /// Final collection date, `YYYY-MM-DD`.
    pub final_collection_date: String,
    /// Debtor name.
    pub dbtr_nm: String,
    /// Debtor mobile number.
    pub mobile: String,
    /// Debtor account number.
    pub dbtr_acc_no: String,
    /// Debtor account type code (e.g. "SAVINGS").
    pub dbtr_acc_tp: String,
    /// Debtor bank identifier.
    pub bnk_id: String,
}

impl MandateForm {
    /// Parse the typed fields and load everything into a builder.
    ///
    /// The caller still supplies the utility code and scheme name.
    pub fn into_builder(self) -> Result<MandateBuilder, MandateError> {
        let amount = Decimal::from_str(self.amount.trim())
            .map_err(|e| MandateError::invalid("amount", e.to_string()))?;
        let frqcy = self.frqcy.trim().parse::<Frequency>()?;
        let first = parse_date(&self.first_collection_date, "firstCollectionDate")?;
        let last = parse_date(&self.final_collection_date, "finalCollectionDate")?;
        let account_type = self.dbtr_acc_tp.trim().parse::<AccountType>()?;

        Ok(Mandate::builder()
            .cons_ref_no(self.consumer_ref_number)
            .source_reference_number(self.reference_number)
            .colltn_amt(amount)
            .frqcy(frqcy)
            .frst_colltn_dt(first)
            .fnl_colltn_dt(last)
            .dbtr_nm(self.dbtr_nm)
            .mobile(self.mobile)
            .dbtr_acc_no(self.dbtr_acc_no)
            .dbtr_acc_tp(account_type)
            .bnk_id(self.bnk_id))
    }
}

fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, MandateError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MandateError::MissingField(field));
    }
    NaiveDate::from_str(trimmed).map_err(|e| MandateError::invalid(field, e.to_string()))
}

//! Bedside calculator rows shown under the patient record.

use cardiorisk_calc::renal::{body_weights, creatinine_clearance, format_body_weights, format_clearance};
use cardiorisk_calc::screening::{mets_ir, ost_index};
use cardiorisk_calc::{Quantity, Sex, NOT_AVAILABLE};
use cardiorisk_common::RecordTable;
use cardiorisk_fhir::PatientRecord;

pub fn derived_table(record: &PatientRecord) -> RecordTable {
    let sex: Option<Sex> = record.patient.gender.parse().ok();
    let age = record.patient.age;
    let height = Quantity::parse(&record.vitals.height);
    let weight = Quantity::parse(&record.vitals.weight);
    let creatinine = Quantity::parse(&record.labs.creatinine);
    let glucose = Quantity::parse(&record.labs.glucose);
    let triglycerides = Quantity::parse(&record.labs.triglycerides);
    let hdl = Quantity::parse(&record.labs.hdl);

    let weights = match (sex, &height, &weight) {
        (Some(sex), Some(h), Some(w)) => body_weights(sex, h, w),
        _ => None,
    };
    let (ideal, adjusted) = format_body_weights(weights.as_ref());

    let clearance = match (age, sex, &height, &weight, &creatinine) {
        (Some(age), Some(sex), Some(h), Some(w), Some(scr)) => creatinine_clearance(age, sex, h, w, scr),
        _ => None,
    };
    let (crcl_actual, crcl_adjusted) = format_clearance(clearance.as_ref());
    let crcl_adjusted = match &clearance {
        Some(c) => format!("{crcl_adjusted} ({})", c.method()),
        None => crcl_adjusted,
    };

    let ost = match (age, sex, &weight) {
        (Some(age), Some(sex), Some(w)) => {
            let ost = ost_index(w, age, sex);
            format!("{} ({} risk)", ost.points, ost.risk)
        }
        _ => NOT_AVAILABLE.to_string(),
    };

    let mets = match (&glucose, &triglycerides, &weight, &height, &hdl) {
        (Some(g), Some(tg), Some(w), Some(h), Some(hdl)) => mets_ir(g, tg, w, h, hdl),
        _ => None,
    }
    .map(|m| format!("{:.2} ({} risk)", m.value, m.risk))
    .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    RecordTable::new()
        .with_row("Ideal Body Weight", ideal)
        .with_row("Adjusted Body Weight", adjusted)
        .with_row("Creatinine Clearance (actual weight)", crcl_actual)
        .with_row("Creatinine Clearance (dosing weight)", crcl_adjusted)
        .with_row("OST Index", ost)
        .with_row("METS-IR", mets)
}

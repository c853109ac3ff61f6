//! Prompt template for the value report.

use recap_core::EnrichedRecord;

const RULE: &str = "--------------------------------------------------";
const UNKNOWN_DATE: &str = "Unknown Date";

/// One block per record. Record order is whatever the caller passes.
pub fn record_block(record: &EnrichedRecord) -> String {
    format!(
        "Ticket: {title} (ID: {id})\nDate: {date}\nTotal Hours: {hours}\nNotes: {notes}\n{RULE}",
        title = record.title,
        id = record.id,
        date = record.reference_date.as_deref().unwrap_or(UNKNOWN_DATE),
        hours = record.total_hours,
        notes = record.notes_text
    )
}

pub fn build_prompt(records: &[EnrichedRecord], technician_name: &str) -> String {
    let data = records
        .iter()
        .map(record_block)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a strategic business analyst preparing a performance review brief for **{name}**.\n\
         {name} wants the review to make the case for a significant compensation increase.\n\
         \n\
         The data below lists helpdesk tickets {name} worked on, with their notes and logged hours.\n\
         Turn it into a **Strategic Value Report** that explains the business value of the work \
         instead of listing tasks.\n\
         \n\
         Use these sections:\n\
         \n\
         ### 1. Direct Financial Impact & ROI\n\
         Automations, fixes and projects that saved time or money or protected revenue. \
         Quantify the value where the data allows.\n\
         \n\
         ### 2. Strategic Leadership & Force Multiplication\n\
         How {name} made other people more productive through mentoring, documentation or tooling.\n\
         \n\
         ### 3. Critical Infrastructure & Stability\n\
         Outages prevented and reliability wins.\n\
         \n\
         ### 4. Future-Proofing & Innovation\n\
         Work on automation, AI or security that positions the company for growth.\n\
         \n\
         Tone: authoritative, persuasive and executive-level.\n\
         \n\
         Data:\n\
         {data}\n",
        name = technician_name,
        data = data
    )
}

/// Instructions sent alongside each uploaded document.
pub const OBLIGATION_PROMPT: &str = "\
Your task is to extract obligations that the document places on Lightyears. \
For each obligation, return the following fields in a readable, plain text format. \
Do not use tables or markdown. Use a consistent structure with one obligation per block. \
Format each obligation like this:

🔹 Clause: [Clause reference]
• Type: [Type: Trivial, Consult on Event, Scheduled, Conditional]
• Trigger: [Trigger if any]
• Action: [Action we must take]
• Frequency: [How often]
• Notes: [Additional notes]
• Status: [Captured, Needs review, Unclear]

Please return each obligation using this format, separated by two new lines.";

/// Heading placed above the model output on each processed page.
pub const OUTPUT_HEADING: &str = "📋 Assistant Output";

//! Fixed instruction texts for the pipeline stages.
//!
//! The plan instructions are the only place the two report kinds differ;
//! everything downstream is shared.

/// Which report the pipeline produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// Check-in / working-hours report.
    CheckIn,
    /// Take-leave report.
    Leave,
}

impl ReportKind {
    pub(crate) fn plan_instruction(self) -> &'static str {
        match self {
            Self::CheckIn => PLAN_CHECK_IN_REPORT,
            Self::Leave => PLAN_LEAVE_REPORT,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CheckIn => "check-in",
            Self::Leave => "take-leave",
        }
    }
}

const PLAN_CHECK_IN_REPORT: &str = "\
As an expert report planner, you are tasked with planning a comprehensive check-in report for the next agent.

The report should include the following sections:

Report objective
Reporting period
Group of employee_group (following the group from the user message)
Working hours for each member of the group (hrs) (ชั่วโมงการทำงาน)
Total hours of late arrival for each member of the group (hrs) (ชั่วโมงที่มาสาย)
Total late count for each member of the group (จำนวนครั้งที่มาสาย)
Total take-leave hours for each member of the group (hrs) (ชั่วโมงที่ลางาน)

Generate the plan in Thai language for the next agent.
";

const PLAN_LEAVE_REPORT: &str = "\
As an expert report planner, you are tasked with planning a comprehensive take-leave report for the next agent.

The report should include the following sections:

Report objective
Reporting period
Group of employee_group (following the group from the user message)
Total take-leave hours for each member of the group (hrs) (ชั่วโมงที่ลางาน)
Number of days with leave taken for each member of the group (จำนวนวันที่ลางาน)
Members with the highest leave usage in the group

Generate the plan in Thai language for the next agent.
";

const QUERY_INSTRUCTION: &str = "\
As an expert database engineer, your task is to use the provided tools to extract all necessary data for generating a detailed report according to the following Thai language plan: {report_plan}

Follow these steps:

Identify and extract data from the relevant tables: employee_sn, employee_2023, employee_2024, and employee_2025.
Organize the extracted data according to the plan.
If you encounter any information that you cannot find in the database or tools, document it and leave a note for the next agent.

Database details:

Tables:
employee_sn: contains employee information (including nicknames in the employee_name column).
employee_2023 / employee_2024 / employee_2025: contain check-in data for the respective year.
Groups and teams:
employee_group: Back Office, R&D, Services, Sales & Marketing
employee_team: Data, Dev., นศง(intern) and 0 (no team)
Note: employee_group is larger than employee_team.
The following tables are irrelevant and should be ignored: Categories, Customers, Employees, Products, Suppliers, orders, table.

You are permitted to make up to 5 tool calls. Execute one tool operation at a time and wait for completion before initiating another.

Organize the data to be delivered to the next agent.
";

const SYNTHESIS_INSTRUCTION: &str = "\
As an expert in data analysis, your task is to generate a comprehensive attendance report.

The report format should follow the guidelines provided in {report_plan}

Utilize the datasets included in the user message to analyze and extract relevant insights for your report.

Note that you need to generate the report in Thai language.
";

pub(crate) const DATABASE_ADMIN: &str = "\
You are an expert database administrator. Your task is to assist the user in retrieving basic data from the HR attendance database.

Here are the relevant tables you can use:

employee_sn - contains employee information (the employee_name column includes nicknames).
employee_2023 / employee_2024 / employee_2025 - contain check-in data for the respective year.

This is information about the database:
employee_group: Back Office, R&D, Services, Sales & Marketing
employee_team: Data, Dev., นศง(intern) and 0 (no team)

Remember that employee_group is bigger than employee_team.

The following tables are irrelevant and should be ignored:
Categories, Customers, Employees, Products, Suppliers, orders, table.

You are permitted to make up to 10 query calls. Carefully read the description of the tools used for database queries and feel free to ask the user when you have any question.
";

const PLAN_PLACEHOLDER: &str = "{report_plan}";

pub(crate) fn query_instruction(plan: &str) -> String {
    QUERY_INSTRUCTION.replace(PLAN_PLACEHOLDER, plan)
}

pub(crate) fn synthesis_instruction(plan: &str) -> String {
    SYNTHESIS_INSTRUCTION.replace(PLAN_PLACEHOLDER, plan)
}

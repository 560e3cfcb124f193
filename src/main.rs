use clap::{CommandFactory, Parser, Subcommand};
use comfy_table::{Attribute, Cell, Color, Table};
use inquire::{Confirm, CustomType, DateSelect, InquireError, Password, Select, Text};
use std::fmt;
use tracing_subscriber::EnvFilter;

use invoice_desk::config::{self, AppSettings};
use invoice_desk::dashboard::DashboardData;
use invoice_desk::preview::{format_currency, render_preview};
use invoice_desk::{
    AuthError, AuthProvider, Error, FormError, HttpInvoiceService, InvoiceApi, InvoiceFilter, InvoiceForm, InvoiceStatus,
    InvoiceSummary, ItemField, PasswordAuth, PaymentMethod, Result, TemplateType,
};

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-desk")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        email: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Configure API endpoints
    Config,
    #[command(flatten)]
    Invoices(InvoiceCommands),
}

/// Commands that talk to the invoice API.
#[derive(Subcommand)]
enum InvoiceCommands {
    /// Create a new invoice
    New,
    /// List invoices, optionally filtered
    List {
        /// Company name contains (case-insensitive)
        #[arg(long, default_value = "")]
        search: String,
        /// Exact status, e.g. Paid
        #[arg(long, default_value = "")]
        status: String,
        /// Exact creation date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        date: String,
        /// Exact payment method, e.g. "Credit Card"
        #[arg(long, default_value = "")]
        method: String,
    },
    /// Show one invoice
    Show { id: String },
    /// Change the status of an invoice
    Status { id: String, status: String },
    /// Delete an invoice
    Delete { id: String },
    /// Show dashboard figures
    Dashboard,
}

/// Form sections offered for editing before saving.
#[derive(Clone, Copy)]
enum Section {
    InvoiceInfo,
    BillFrom,
    BillTo,
    Items,
    PaymentTerms,
    ShippingInfo,
    BankInfo,
    Notes,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Section::InvoiceInfo => "Invoice Information",
            Section::BillFrom => "Bill From",
            Section::BillTo => "Bill To",
            Section::Items => "Items",
            Section::PaymentTerms => "Payment Terms",
            Section::ShippingInfo => "Shipping Information",
            Section::BankInfo => "Bank Information",
            Section::Notes => "Notes / Terms",
        };
        f.write_str(label)
    }
}

enum Action {
    Save,
    Preview,
    Edit(Section),
    Cancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Save => f.write_str("💾 Save Invoice"),
            Action::Preview => f.write_str("👀 Preview"),
            Action::Edit(section) => write!(f, "✏️  Edit {section}"),
            Action::Cancel => f.write_str("✖ Cancel"),
        }
    }
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help().ok();
        return;
    };

    match run(command) {
        Ok(()) => {}
        Err(Error::Prompt(InquireError::OperationCanceled | InquireError::OperationInterrupted)) => {
            println!("Cancelled");
        }
        Err(e) => {
            eprintln!("❌ Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(command: Commands) -> Result<()> {
    let config_dir = config::config_dir()?;
    let settings = AppSettings::load_or_init(&config_dir)?.with_env_overrides();
    let mut auth = PasswordAuth::new(&settings, Some(config::session_path(&config_dir)))?;

    match command {
        Commands::Login { email } => {
            let email = match email {
                Some(e) => e,
                None => Text::new("Email:").prompt()?,
            };
            let password = Password::new("Password:").without_confirmation().prompt()?;
            let session = auth.sign_in(&email, &password)?;
            println!("✅ Signed in as {}", session.email);
        }
        Commands::Logout => match auth.sign_out() {
            Ok(()) => println!("✅ Signed out."),
            Err(AuthError::SignedOut) => println!("Not signed in."),
            Err(e) => return Err(e.into()),
        },
        Commands::Whoami => match auth.current_user() {
            Some(user) => println!("{} ({})", user.email, user.user_id),
            None => println!("Not signed in."),
        },
        Commands::Config => {
            setup_config_wizard(&config_dir, &settings)?;
        }
        Commands::Invoices(command) => {
            if !auth.is_authenticated() {
                println!("⚠️  Not signed in; requests are sent without a token. Run `invoice-desk login`.");
            }
            let api = HttpInvoiceService::new(&settings.api_base_url, settings.timeout_secs, auth)?;
            run_api_command(command, &api)?;
        }
    }
    Ok(())
}

fn run_api_command(command: InvoiceCommands, api: &dyn InvoiceApi) -> Result<()> {
    match command {
        InvoiceCommands::New => new_invoice_wizard(api)?,
        InvoiceCommands::List { search, status, date, method } => {
            let filter = InvoiceFilter { search, status, date, payment_method: method };
            list_invoices(api, &filter)?;
        }
        InvoiceCommands::Show { id } => {
            let invoice = api.get_invoice(&id)?;
            println!("{}", serde_json::to_string_pretty(&invoice).unwrap_or_else(|_| invoice.to_string()));
        }
        InvoiceCommands::Status { id, status } => {
            let status = InvoiceStatus::parse(&status).ok_or_else(|| {
                let known: Vec<_> = InvoiceStatus::ALL.iter().map(|s| s.as_str()).collect();
                Error::Usage(format!("Unknown status '{}'. Expected one of: {}", status, known.join(", ")))
            })?;
            api.update_invoice(&id, &serde_json::json!({ "status": status.as_str() }))?;
            println!("✅ Invoice {id} marked as {status}");
        }
        InvoiceCommands::Delete { id } => {
            let sure = Confirm::new(&format!("Delete invoice {id}?")).with_default(false).prompt()?;
            if sure {
                api.delete_invoice(&id)?;
                println!("✅ Invoice deleted successfully");
            } else {
                println!("Cancelled");
            }
        }
        InvoiceCommands::Dashboard => show_dashboard(&api.dashboard()?),
    }
    Ok(())
}

// ==========================================
// 1. New Invoice Wizard
// ==========================================

fn new_invoice_wizard(api: &dyn InvoiceApi) -> Result<()> {
    let mut form = InvoiceForm::new();

    loop {
        let template = Select::new("Invoice Type:", TemplateType::OPTIONS.to_vec()).prompt()?;
        match form.select_template(api, template) {
            Ok(()) => break,
            Err(e) => {
                println!("❌ Could not generate the invoice number: {e}");
                if !Confirm::new("Try again?").with_default(true).prompt()? {
                    println!("❌ No invoice number reserved. Aborting.");
                    return Ok(());
                }
            }
        }
    }
    if let Some(number) = &form.draft().invoice_number {
        println!("✅ Invoice Number: {number}");
    }

    let mut sections = vec![
        Section::InvoiceInfo,
        Section::BillFrom,
        Section::BillTo,
        Section::Items,
        Section::PaymentTerms,
    ];
    if form.draft().template_type == TemplateType::Proforma {
        sections.push(Section::ShippingInfo);
    }
    sections.extend([Section::BankInfo, Section::Notes]);

    for section in &sections {
        edit_section(&mut form, *section)?;
    }

    loop {
        print_totals(&form);

        let mut actions = vec![Action::Save, Action::Preview];
        actions.extend(sections.iter().map(|s| Action::Edit(*s)));
        actions.push(Action::Cancel);

        match Select::new("What next?", actions).with_page_size(12).prompt()? {
            Action::Save => match form.submit(api) {
                Ok(created) => {
                    println!("✅ Invoice {} created successfully!", created.id);
                    return Ok(());
                }
                Err(FormError::Invalid(errors)) => {
                    println!("❌ Please fix the errors before saving:");
                    for (field, message) in errors.iter() {
                        println!("   • {field}: {message}");
                    }
                }
                Err(e) => println!("❌ {e}"),
            },
            Action::Preview => {
                let text = render_preview(form.draft(), form.totals())?;
                println!("\n{text}");
            }
            Action::Edit(section) => edit_section(&mut form, section)?,
            Action::Cancel => {
                if Confirm::new("Discard this invoice?").with_default(false).prompt()? {
                    form.cancel();
                    println!("Invoice discarded.");
                    return Ok(());
                }
            }
        }
    }
}

fn edit_section(form: &mut InvoiceForm, section: Section) -> Result<()> {
    println!("\n--- {section} ---");
    match section {
        Section::InvoiceInfo => enter_invoice_info(form),
        Section::BillFrom => enter_party(form, true),
        Section::BillTo => enter_party(form, false),
        Section::Items => enter_invoice_items(form),
        Section::PaymentTerms => enter_payment(form),
        Section::ShippingInfo => enter_shipping(form),
        Section::BankInfo => enter_bank_info(form),
        Section::Notes => {
            let draft = form.draft();
            let label = draft.notes_label();
            let notes = Text::new(&format!("{label}:")).with_default(&draft.notes).prompt()?;
            form.update(|d| d.notes = notes);
            Ok(())
        }
    }
}

// ==========================================
// 2. Data Entry Helpers
// ==========================================

fn enter_invoice_info(form: &mut InvoiceForm) -> Result<()> {
    let draft = form.draft();
    let today = chrono::Local::now().date_naive();
    let is_proforma = draft.template_type == TemplateType::Proforma;

    let invoice_date = DateSelect::new("Invoice Date:")
        .with_default(draft.invoice_date.unwrap_or(today))
        .prompt()?;

    if is_proforma {
        let valid_until = DateSelect::new("Valid Until:")
            .with_default(draft.valid_until.unwrap_or(today))
            .prompt()?;
        form.update(|d| {
            d.invoice_date = Some(invoice_date);
            d.valid_until = Some(valid_until);
        });
    } else {
        let due_date = DateSelect::new("Due Date:")
            .with_default(draft.due_date.unwrap_or(today))
            .prompt()?;
        form.update(|d| {
            d.invoice_date = Some(invoice_date);
            d.due_date = Some(due_date);
        });
    }
    Ok(())
}

fn enter_party(form: &mut InvoiceForm, is_issuer: bool) -> Result<()> {
    let current = if is_issuer { &form.draft().issuer } else { &form.draft().client };
    let company_name = Text::new("Company Name (Required):").with_default(&current.company_name).prompt()?;
    let address = Text::new("Address:").with_default(&current.address).prompt()?;
    let city_state_zip = Text::new("City, State, ZIP:").with_default(&current.city_state_zip).prompt()?;
    let phone = Text::new("Phone:").with_default(&current.phone).prompt()?;
    let email = Text::new("Email:").with_default(&current.email).prompt()?;

    form.update(|d| {
        let party = if is_issuer { &mut d.issuer } else { &mut d.client };
        party.company_name = company_name;
        party.address = address;
        party.city_state_zip = city_state_zip;
        party.phone = phone;
        party.email = email;
    });
    Ok(())
}

fn enter_invoice_items(form: &mut InvoiceForm) -> Result<()> {
    // Drop placeholder rows so the loop starts from what the user actually typed.
    let blank: Vec<usize> = (0..form.draft().items.len())
        .rev()
        .filter(|i| !form.draft().items[*i].is_touched())
        .collect();
    for index in blank {
        form.remove_item(index);
    }

    println!("(Leave Description empty to finish)");
    loop {
        print_items(form);

        let options = vec!["➕ Add Item", "➖ Remove Item", "✅ Done"];
        let choice = Select::new("Items:", options).prompt()?;
        if choice.starts_with("✅") {
            break;
        }
        if choice.starts_with("➖") {
            let labels: Vec<String> = form
                .draft()
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, item.description))
                .collect();
            if labels.is_empty() {
                continue;
            }
            let picked = Select::new("Remove which item?", labels).raw_prompt()?;
            form.remove_item(picked.index);
            continue;
        }

        let desc = Text::new("Description (leave empty to finish):").prompt()?;
        if desc.trim().is_empty() {
            break;
        }
        let quantity = Text::new("Quantity:").with_default("1").prompt()?;
        let unit_price = Text::new("Unit Price ($):").prompt()?;

        form.add_item();
        let index = form.draft().items.len() - 1;
        form.set_item_field(index, ItemField::Description, desc);
        form.set_item_field(index, ItemField::Quantity, quantity);
        form.set_item_field(index, ItemField::UnitPrice, unit_price);
    }

    if form.draft().items.is_empty() {
        form.add_item();
    }

    let draft = form.draft();
    let tax = Text::new("Tax Rate %:").with_default(&draft.tax_rate_percent).prompt()?;
    let shipping = Text::new("Shipping ($):").with_default(&draft.shipping_cost).prompt()?;
    let discount = Text::new("Discount ($):").with_default(&draft.discount_amount).prompt()?;
    form.set_tax_rate(&tax);
    form.update(|d| {
        d.shipping_cost = shipping;
        d.discount_amount = discount;
    });
    Ok(())
}

fn enter_payment(form: &mut InvoiceForm) -> Result<()> {
    let terms = Text::new("Payment Terms (Required):")
        .with_default(&form.draft().payment_terms)
        .prompt()?;

    let mut select = Select::new("Payment Method:", PaymentMethod::ALL.to_vec());
    if let Some(current) = form.draft().payment_method {
        if let Some(pos) = PaymentMethod::ALL.iter().position(|m| *m == current) {
            select = select.with_starting_cursor(pos);
        }
    }
    let method = select.prompt()?;

    form.update(|d| {
        d.payment_terms = terms;
        d.payment_method = Some(method);
    });
    Ok(())
}

fn enter_shipping(form: &mut InvoiceForm) -> Result<()> {
    let method = Text::new("Shipping Method:")
        .with_default(&form.draft().shipping_method)
        .prompt()?;
    let has_delivery = Confirm::new("Set an estimated delivery date?")
        .with_default(form.draft().estimated_delivery_date.is_some())
        .prompt()?;
    let delivery = if has_delivery {
        let default = form
            .draft()
            .estimated_delivery_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Some(DateSelect::new("Estimated Delivery:").with_default(default).prompt()?)
    } else {
        None
    };
    form.update(|d| {
        d.shipping_method = method;
        d.estimated_delivery_date = delivery;
    });
    Ok(())
}

fn enter_bank_info(form: &mut InvoiceForm) -> Result<()> {
    if form.draft().payment_method != Some(PaymentMethod::BankTransfer) {
        let wanted = Confirm::new("Add bank details? (only needed for bank transfers)")
            .with_default(false)
            .prompt()?;
        if !wanted {
            return Ok(());
        }
    }
    let bank = &form.draft().bank_info;
    let company_name = Text::new("Account Holder:").with_default(&bank.company_name).prompt()?;
    let bank_name = Text::new("Bank Name:").with_default(&bank.bank_name).prompt()?;
    let account_number = Text::new("Account Number:").with_default(&bank.account_number).prompt()?;
    let routing_number = Text::new("Routing Number:").with_default(&bank.routing_number).prompt()?;
    form.update(|d| {
        d.bank_info.company_name = company_name;
        d.bank_info.bank_name = bank_name;
        d.bank_info.account_number = account_number;
        d.bank_info.routing_number = routing_number;
    });
    Ok(())
}

fn print_items(form: &InvoiceForm) {
    let items = &form.draft().items;
    if items.is_empty() {
        println!("(No items yet)");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["#", "Description", "Qty", "Unit Price", "Total"]);
    for (i, item) in items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&item.description),
            Cell::new(&item.quantity),
            Cell::new(&item.unit_price),
            Cell::new(format_currency(item.line_total())),
        ]);
    }
    println!("{table}");
}

fn print_totals(form: &InvoiceForm) {
    let totals = form.totals();
    let tax_rate = &form.draft().tax_rate_percent;

    let mut table = Table::new();
    table.add_row(vec![Cell::new("Subtotal"), Cell::new(format_currency(totals.subtotal))]);
    table.add_row(vec![
        Cell::new(format!("Tax ({}%)", if tax_rate.is_empty() { "0" } else { tax_rate.as_str() })),
        Cell::new(format_currency(totals.tax_amount)),
    ]);
    table.add_row(vec![Cell::new("Shipping"), Cell::new(format_currency(totals.shipping_cost))]);
    table.add_row(vec![
        Cell::new("Discount"),
        Cell::new(format!("-{}", format_currency(totals.discount_amount))).fg(Color::Rgb { r: 185, g: 28, b: 28 }),
    ]);
    table.add_row(vec![
        Cell::new("Total Due").add_attribute(Attribute::Bold),
        Cell::new(format_currency(totals.total_due)).add_attribute(Attribute::Bold),
    ]);
    println!("\n{table}");
}

// ==========================================
// 3. List & Dashboard
// ==========================================

fn status_cell(status: &str) -> Cell {
    let cell = Cell::new(status);
    match InvoiceStatus::parse(status) {
        Some(InvoiceStatus::Paid) => cell.fg(Color::Rgb { r: 4, g: 120, b: 87 }),
        Some(InvoiceStatus::Overdue) => cell.fg(Color::Rgb { r: 185, g: 28, b: 28 }),
        Some(InvoiceStatus::Pending) => cell.fg(Color::Rgb { r: 180, g: 83, b: 9 }),
        _ => cell,
    }
}

fn list_invoices(api: &dyn InvoiceApi, filter: &InvoiceFilter) -> Result<()> {
    let status = (!filter.status.is_empty()).then_some(filter.status.as_str());
    let invoices: Vec<InvoiceSummary> = api.list_invoices(status)?;
    let rows = filter.apply(&invoices);

    if rows.is_empty() {
        println!("(None found)");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Invoice ID"),
        Cell::new("Date Created"),
        Cell::new("Company"),
        Cell::new("Value"),
        Cell::new("Payment Method"),
        Cell::new("Deadline"),
        Cell::new("Status"),
    ]);
    for invoice in &rows {
        table.add_row(vec![
            Cell::new(&invoice.id),
            Cell::new(&invoice.date_created),
            Cell::new(&invoice.company_name),
            Cell::new(&invoice.invoice_value),
            Cell::new(if invoice.payment_method.is_empty() { "N/A" } else { invoice.payment_method.as_str() }),
            Cell::new(&invoice.payment_deadline),
            status_cell(&invoice.status),
        ]);
    }
    println!("{table}");
    println!("{} of {} invoices", rows.len(), invoices.len());
    Ok(())
}

fn show_dashboard(data: &DashboardData) {
    println!("\n--- Dashboard ---");
    println!("📄 Total Invoices Issued: {}", data.cards.total_invoices_issued);
    println!("💰 Total Invoices Paid:   {}", data.cards.total_invoices_payment);

    let mut status_table = Table::new();
    status_table.set_header(vec![Cell::new("Status"), Cell::new("Invoices")]);
    for entry in &data.invoices_status {
        status_table.add_row(vec![status_cell(&entry.label), Cell::new(entry.value)]);
    }
    println!("\n--- Invoices by Status ---");
    println!("{status_table}");

    let mut revenue_table = Table::new();
    revenue_table.set_header(vec![Cell::new("Month"), Cell::new("Revenue")]);
    let mut total = 0.0;
    for entry in &data.monthly_revenue {
        revenue_table.add_row(vec![Cell::new(&entry.month), Cell::new(format_currency(entry.revenue))]);
        total += entry.revenue;
    }
    revenue_table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(format_currency(total)).add_attribute(Attribute::Bold),
    ]);
    println!("\n--- Monthly Revenue ---");
    println!("{revenue_table}");

    if !data.pending_payments.is_empty() {
        let mut pending_table = Table::new();
        pending_table.set_header(vec![Cell::new("Invoice ID"), Cell::new("Amount"), Cell::new("Date"), Cell::new("Status")]);
        for p in &data.pending_payments {
            pending_table.add_row(vec![
                Cell::new(&p.id),
                Cell::new(&p.amount),
                Cell::new(&p.date),
                Cell::new(&p.status).fg(Color::Rgb { r: 185, g: 28, b: 28 }),
            ]);
        }
        println!("\n--- Pending Payments ---");
        println!("{pending_table}");
    }
}

// ==========================================
// 4. Config
// ==========================================

fn setup_config_wizard(dir: &std::path::Path, current: &AppSettings) -> Result<()> {
    println!("\n⚙️  --- Configuration Setup ---");
    let api_base_url = Text::new("API Base URL:").with_default(&current.api_base_url).prompt()?;
    let auth_url = Text::new("Auth URL:").with_default(&current.auth_url).prompt()?;
    let api_key = Text::new("Auth API Key:").with_default(&current.api_key).prompt()?;
    let timeout_secs = CustomType::<u64>::new("Request Timeout (seconds):")
        .with_default(current.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()?;

    let settings = AppSettings {
        api_base_url,
        auth_url,
        api_key,
        timeout_secs,
    };
    settings.save(dir)?;
    println!("✅ Settings saved.");
    Ok(())
}

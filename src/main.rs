use anyhow::{Context, bail};
use chrono::{Datelike, Local, NaiveDate};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use dcms_desk::{
    ApiClient, ApiError, Config, SessionStore,
    agenda::{day_agenda, month_grid_now},
    billing::{outstanding, parse_amount, summarize},
    models::{Payment, Quotation, role_label},
    stores::{
        Resource, Store,
        appointment_store::AppointmentStore,
        patient_store::PatientStore,
        payment_store::{PaymentDraft, PaymentFilter, PaymentStore},
    },
    views,
};

const USAGE: &str = "usage: dcms-desk <command>
  login <username> <password>
  logout
  whoami
  agenda [YYYY-MM]
  today
  balances
  pay <quotation_id> <amount> <method_id>
  report [YYYY-MM-DD YYYY-MM-DD]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::from_env()?;
    let session = match &cfg.session_file {
        Some(path) => SessionStore::load(path),
        None => SessionStore::in_memory(),
    };
    let client = ApiClient::new(&cfg, session)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run(&cfg, &client, &args).await;

    if let Err(err) = &result {
        if err
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_session_fatal)
        {
            eprintln!("Your session has ended, run `dcms-desk login` again.");
        }
    }
    result
}

async fn run(cfg: &Config, client: &ApiClient, args: &[String]) -> anyhow::Result<()> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["login", username, password] => {
            let s = client
                .login(username, password, Some(&cfg.device_name), true)
                .await?;
            println!(
                "Logged in as {} ({}) at {}",
                s.user.display_name,
                roles(&s.user.roles),
                s.clinic.clinic_name
            );
        }
        ["logout"] => {
            client.logout().await?;
            println!("Logged out.");
        }
        ["whoami"] => {
            let me = client.me().await?;
            println!(
                "{} ({}) at {}",
                me.dcms_user.display_name,
                roles(&me.dcms_user.roles),
                me.clinic.clinic_name
            );
        }
        ["agenda"] => agenda(client, Local::now().date_naive()).await?,
        ["agenda", month] => {
            let reference = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
                .with_context(|| format!("expected YYYY-MM, got {month:?}"))?;
            agenda(client, reference).await?
        }
        ["today"] => today(client).await?,
        ["balances"] => balances(client).await?,
        ["pay", quotation_id, amount, method_id] => {
            let quotation_id: Uuid = quotation_id.parse().context("invalid quotation id")?;
            let method_id: Uuid = method_id.parse().context("invalid payment method id")?;
            let amount = parse_amount(amount)
                .with_context(|| format!("invalid amount {amount:?}"))?;
            pay(client, quotation_id, amount, method_id).await?
        }
        ["report"] => {
            let today = Local::now().date_naive();
            let from = today.with_day(1).unwrap_or(today);
            report(client, from, today).await?
        }
        ["report", from, to] => {
            let from = NaiveDate::parse_from_str(from, "%Y-%m-%d").context("invalid from date")?;
            let to = NaiveDate::parse_from_str(to, "%Y-%m-%d").context("invalid to date")?;
            report(client, from, to).await?
        }
        _ => bail!("{USAGE}"),
    }
    Ok(())
}

fn roles(roles: &[String]) -> String {
    roles
        .iter()
        .map(|r| role_label(r))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turn a store's swallowed failure back into an error for the command line.
async fn checked<R: Resource>(store: &Store<R>, ok: bool) -> anyhow::Result<()> {
    if ok {
        return Ok(());
    }
    match store.take_error().await {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

async fn agenda(client: &ApiClient, reference: NaiveDate) -> anyhow::Result<()> {
    let appointments = AppointmentStore::new(client.clone());
    let ok = appointments.load_month(reference).await;
    checked(&appointments, ok).await?;

    let items = appointments.items().await;
    let grid = month_grid_now(reference, &items);
    print!("{}", views::render_month(reference, &grid));
    Ok(())
}

async fn today(client: &ApiClient) -> anyhow::Result<()> {
    let date = Local::now().date_naive();
    let appointments = AppointmentStore::new(client.clone());
    let patients = PatientStore::new(client.clone());

    let (appts_ok, patients_ok) = tokio::join!(appointments.load_day(date), patients.fetch_all());
    checked(&appointments, appts_ok).await?;
    checked(&patients, patients_ok).await?;

    let items = appointments.items().await;
    let names = patients.names().await;
    print!("{}", views::render_day(date, &day_agenda(date, &items), &names));
    Ok(())
}

async fn balances(client: &ApiClient) -> anyhow::Result<()> {
    let quotations: Store<Quotation> = Store::new(client.clone());
    let payments: Store<Payment> = Store::new(client.clone());

    let (q_ok, p_ok) = tokio::join!(quotations.fetch_all(), payments.fetch_all());
    checked(&quotations, q_ok).await?;
    checked(&payments, p_ok).await?;

    let open = outstanding(&quotations.items().await, &payments.items().await);
    if open.is_empty() {
        println!("No outstanding quotations.");
    } else {
        print!("{}", views::render_balances(&open));
    }
    Ok(())
}

async fn pay(
    client: &ApiClient,
    quotation_id: Uuid,
    amount_cents: i64,
    method_id: Uuid,
) -> anyhow::Result<()> {
    let user = client
        .session()
        .get()
        .await
        .ok_or_else(ApiError::not_logged_in)?
        .user;

    let quotations: Store<Quotation> = Store::new(client.clone());
    let payments = PaymentStore::new(client.clone());

    let quotation = match quotations.fetch_one(quotation_id).await {
        Some(q) => q,
        None => {
            checked(&quotations, false).await?;
            bail!("quotation {quotation_id} not found");
        }
    };
    let ok = payments
        .search(PaymentFilter {
            quotation_id: Some(quotation_id),
            ..Default::default()
        })
        .await;
    checked(&payments, ok).await?;

    let draft = PaymentDraft {
        quotation_id,
        amount_cents,
        payment_date: Local::now().date_naive(),
        method_id,
        created_by: user.user_id,
    };
    if payments.register(&quotation, draft).await.is_none() {
        checked(&payments, false).await?;
    }

    let balance = payments.balance_of(&quotation).await;
    print!("{}", views::render_balances(&[balance]));
    Ok(())
}

async fn report(client: &ApiClient, from: NaiveDate, to: NaiveDate) -> anyhow::Result<()> {
    if from > to {
        bail!("report range is backwards: {from} > {to}");
    }
    let payments = PaymentStore::new(client.clone());
    let ok = payments
        .search(PaymentFilter {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        })
        .await;
    checked(&payments, ok).await?;

    let summary = summarize(&payments.items().await, from, to);
    print!("{}", views::render_summary(&summary));
    Ok(())
}

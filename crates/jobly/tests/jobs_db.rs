//! Job services against a live Postgres.
//!
//! Skipped unless `DATABASE_URL` is set. Each test works on its own
//! connection with TEMP tables, which shadow any real `companies`/`jobs`.

use jobly::{
    Company, Job, JobPatch, JoblyError, JoblyResult, NewJob, SearchCriteria, SqlValue,
    UpdatePayload,
};
use rust_decimal::Decimal;
use tokio_postgres::{Client, NoTls};

async fn try_connect(test: &str) -> JoblyResult<Option<Client>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(JoblyError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });

    client
        .batch_execute(
            "CREATE TEMP TABLE companies (
                handle VARCHAR(25) PRIMARY KEY CHECK (handle = lower(handle)),
                name TEXT UNIQUE NOT NULL,
                num_employees INTEGER CHECK (num_employees >= 0),
                description TEXT,
                logo_url TEXT
            );
            CREATE TEMP TABLE jobs (
                id SERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                salary INTEGER CHECK (salary >= 0),
                equity NUMERIC CHECK (equity <= 1.0),
                company_handle VARCHAR(25) NOT NULL
                    REFERENCES companies ON DELETE CASCADE
            );
            INSERT INTO companies (handle, name, num_employees, description, logo_url)
            VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
                   ('c2', 'C2', 2, 'Desc2', NULL);",
        )
        .await
        .map_err(JoblyError::from_db_error)?;

    Ok(Some(client))
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn new_job(title: &str, salary: Option<i32>, equity: Option<&str>) -> NewJob {
    NewJob {
        title: title.to_string(),
        salary,
        equity: equity.map(dec),
        company_handle: "c1".to_string(),
    }
}

async fn seed_jobs(client: &Client) -> JoblyResult<Vec<Job>> {
    Ok(vec![
        Job::create(client, &new_job("Job2", Some(200), Some("0.2"))).await?,
        Job::create(client, &new_job("Job1", Some(100), Some("0.1"))).await?,
        Job::create(client, &new_job("Job3", Some(300), Some("0"))).await?,
        Job::create(client, &new_job("Other", None, None)).await?,
    ])
}

fn titles(jobs: &[Job]) -> Vec<&str> {
    jobs.iter().map(|j| j.title.as_str()).collect()
}

#[tokio::test]
async fn create_returns_row_and_rejects_duplicates() -> JoblyResult<()> {
    let Some(client) = try_connect("create_returns_row_and_rejects_duplicates").await? else {
        return Ok(());
    };

    let job = Job::create(&client, &new_job("New", Some(1000), Some("0.05"))).await?;
    assert_eq!(job.title, "New");
    assert_eq!(job.salary, Some(1000));
    assert_eq!(job.equity, Some(dec("0.05")));
    assert_eq!(job.company_handle, "c1");

    let err = Job::create(&client, &new_job("New", None, None))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());

    let err = Job::create(&client, &new_job("Bad", Some(-1), None))
        .await
        .unwrap_err();
    assert!(matches!(err, JoblyError::InvalidInput(_)));
    Ok(())
}

#[tokio::test]
async fn create_with_unknown_company_is_fk_violation() -> JoblyResult<()> {
    let Some(client) = try_connect("create_with_unknown_company_is_fk_violation").await? else {
        return Ok(());
    };

    let mut job = new_job("Orphan", None, None);
    job.company_handle = "nope".to_string();
    let err = Job::create(&client, &job).await.unwrap_err();
    assert!(matches!(err, JoblyError::ForeignKeyViolation(_)));
    Ok(())
}

#[tokio::test]
async fn find_all_filters_and_orders_by_title() -> JoblyResult<()> {
    let Some(client) = try_connect("find_all_filters_and_orders_by_title").await? else {
        return Ok(());
    };
    seed_jobs(&client).await?;

    let all = Job::find_all(&client, &SearchCriteria::new()).await?;
    assert_eq!(titles(&all), ["Job1", "Job2", "Job3", "Other"]);

    let by_title = Job::find_all(&client, &SearchCriteria::new().title("JOB")).await?;
    assert_eq!(titles(&by_title), ["Job1", "Job2", "Job3"]);

    let by_salary = Job::find_all(&client, &SearchCriteria::new().min_salary(150)).await?;
    assert_eq!(titles(&by_salary), ["Job2", "Job3"]);

    let by_whole_float = Job::find_all(&client, &SearchCriteria::new().min_salary(150.0)).await?;
    assert_eq!(titles(&by_whole_float), ["Job2", "Job3"]);

    let null_floor: SearchCriteria = serde_json::from_str(r#"{"minSalary": null}"#).unwrap();
    assert!(Job::find_all(&client, &null_floor).await?.is_empty());

    let with_equity = Job::find_all(&client, &SearchCriteria::new().has_equity(true)).await?;
    assert_eq!(titles(&with_equity), ["Job1", "Job2"]);

    let without_flag = Job::find_all(&client, &SearchCriteria::new().has_equity(false)).await?;
    assert_eq!(without_flag.len(), 4);

    let combined = SearchCriteria::new()
        .title("job")
        .min_salary(150)
        .has_equity(true);
    let found = Job::find_all(&client, &combined).await?;
    assert_eq!(titles(&found), ["Job2"]);
    Ok(())
}

#[tokio::test]
async fn find_all_with_non_numeric_min_salary_fails_at_execution() -> JoblyResult<()> {
    let Some(client) =
        try_connect("find_all_with_non_numeric_min_salary_fails_at_execution").await?
    else {
        return Ok(());
    };
    seed_jobs(&client).await?;

    let criteria = SearchCriteria::new().min_salary(SqlValue::from("lots"));
    let err = Job::find_all(&client, &criteria).await.unwrap_err();
    assert!(matches!(err, JoblyError::Query(_)));
    assert!(!err.is_client_error());
    Ok(())
}

#[tokio::test]
async fn get_includes_company() -> JoblyResult<()> {
    let Some(client) = try_connect("get_includes_company").await? else {
        return Ok(());
    };
    let jobs = seed_jobs(&client).await?;

    let detail = Job::get(&client, jobs[0].id).await?;
    assert_eq!(detail.title, "Job2");
    assert_eq!(detail.company.handle, "c1");
    assert_eq!(detail.company.num_employees, Some(1));

    let err = Job::get(&client, 0).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn update_changes_only_supplied_fields() -> JoblyResult<()> {
    let Some(client) = try_connect("update_changes_only_supplied_fields").await? else {
        return Ok(());
    };
    let jobs = seed_jobs(&client).await?;
    let id = jobs[1].id;

    let patch = JobPatch {
        title: Some("Renamed".into()),
        salary: None,
        equity: Some(None),
    };
    let updated = Job::update(&client, id, &patch.into_payload()?).await?;
    assert_eq!(updated.id, id);
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.salary, Some(100));
    assert_eq!(updated.equity, None);
    assert_eq!(updated.company_handle, "c1");

    let err = Job::update(&client, id, &UpdatePayload::new())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = Job::update(&client, 0, &UpdatePayload::new().set("title", "x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn company_update_translates_request_names() -> JoblyResult<()> {
    let Some(client) = try_connect("company_update_translates_request_names").await? else {
        return Ok(());
    };

    let payload: UpdatePayload =
        serde_json::from_str(r#"{"numEmployees": 10, "logoUrl": null}"#).unwrap();
    let company = Company::update(&client, "c1", &payload).await?;
    assert_eq!(company.num_employees, Some(10));
    assert_eq!(company.logo_url, None);
    assert_eq!(company.name, "C1");

    let err = Company::update(&client, "nope", &payload).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn remove_deletes_once() -> JoblyResult<()> {
    let Some(client) = try_connect("remove_deletes_once").await? else {
        return Ok(());
    };
    let jobs = seed_jobs(&client).await?;
    let id = jobs[0].id;

    Job::remove(&client, id).await?;
    assert!(Job::get(&client, id).await.unwrap_err().is_not_found());
    assert!(Job::remove(&client, id).await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn work_inside_a_transaction_rolls_back() -> JoblyResult<()> {
    let Some(mut client) = try_connect("work_inside_a_transaction_rolls_back").await? else {
        return Ok(());
    };

    let tx = client
        .transaction()
        .await
        .map_err(JoblyError::from_db_error)?;
    Job::create(&tx, &new_job("Temp", None, None)).await?;
    assert_eq!(Job::find_all(&tx, &SearchCriteria::new()).await?.len(), 1);
    tx.rollback().await.map_err(JoblyError::from_db_error)?;

    assert!(Job::find_all(&client, &SearchCriteria::new()).await?.is_empty());
    Ok(())
}

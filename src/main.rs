use anyhow::Result;
use forumdyn::{load_sample_data, Config, DynamoBackend, Forum, Forums};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn rule() {
    println!("{}", "-".repeat(88));
}

fn print_forums(forums: &[Forum]) {
    if forums.is_empty() {
        println!("I don't know about any forums.\n");
    } else {
        println!("\nHere are your {} forums:\n", forums.len());
        println!("{forums:#?}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forumdyn=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    rule();
    println!("Welcome to the Amazon DynamoDB getting started demo.");
    println!("Target: {}", config.target_display());
    rule();

    let mut forums = Forums::new(DynamoBackend::from_config(&config).await);

    if !forums.exists(&config.table_name).await? {
        println!("\nCreating table {}...", config.table_name);
        let table = forums.create_table(&config.table_name).await?;
        println!("\nCreated table {}.", table.name);
    }

    let forum_data = load_sample_data(&config.sample_file)?;
    println!(
        "\nReading data from '{}' into your table.",
        config.sample_file.display()
    );
    forums.write_batch(&forum_data).await?;
    println!(
        "\nWrote {} forums into {}.",
        forum_data.len(),
        config.table_name
    );
    rule();

    match forums.get_forum("Amazon DynamoDB").await? {
        Some(forum) => println!("\nHere's what I found:\n{forum:#?}"),
        None => println!("\nNo forum named 'Amazon DynamoDB' in {}.", config.table_name),
    }
    rule();

    forums
        .add_forum(&Forum::new(
            "SQL server",
            "Amazon Web Services",
            4,
            2,
            1000,
        ))
        .await?;
    println!("\nAdded item to '{}'.", config.table_name);
    rule();

    print_forums(&forums.scan_forums().await?);
    rule();

    let updated = forums
        .update_forum(&Forum::new(
            "SQL server",
            "Amazon Web Services",
            4,
            2,
            2000,
        ))
        .await?;
    println!("\nUpdated:\n{updated:#?}");
    rule();

    forums.delete_forum("SQL server").await?;
    println!("\nRemoved item from the table.");
    rule();

    print_forums(&forums.scan_forums().await?);
    rule();

    rule();
    println!("Table list:\n");
    println!("{:?}", forums.list_tables().await?);

    forums.delete_table().await?;
    println!("Deleted {}.", config.table_name);

    rule();
    println!(
        "Don't forget to delete the table when you're done or you might incur \
         charges on your account."
    );
    rule();

    Ok(())
}

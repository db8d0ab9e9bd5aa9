//! Review commands.

use anyhow::{bail, Result};
use console::style;
use dialoguer::{Confirm, Input};
use storefront_commerce::reviews::{Review, ReviewPanel, ReviewSort, VoteType};
use storefront_commerce::{ProductId, ReviewId};
use storefront_core::Storefront;

use super::{ReviewsArgs, ReviewsCommand};
use crate::context::Context;
use crate::output::{bar, stars};

pub async fn run(args: ReviewsArgs, ctx: &Context) -> Result<()> {
    let (shop, mut events) = ctx.storefront()?;

    let result = match args.command {
        ReviewsCommand::List {
            product,
            sort,
            limit,
        } => list(ctx, &shop, &product, sort.parse()?, limit).await,
        ReviewsCommand::Stats { product } => stats(ctx, &shop, &product).await,
        ReviewsCommand::Vote {
            product,
            review,
            direction,
        } => vote(ctx, &shop, &product, &review, direction.parse()?).await,
        ReviewsCommand::Delete {
            product,
            review,
            yes,
        } => delete(ctx, &shop, &product, &review, yes).await,
        ReviewsCommand::Write {
            product,
            rating,
            comment,
        } => write(ctx, &shop, &product, rating, comment).await,
    };

    ctx.flush_toasts(&mut events);
    result
}

async fn load(ctx: &Context, panel: &ReviewPanel, product: &str) -> Result<()> {
    let spinner = ctx.output.spinner("Loading reviews...");
    panel.set_product(ProductId::new(product)).await;
    spinner.finish_and_clear();

    if let Some(error) = panel.state().error {
        bail!("Could not load reviews: {}", error);
    }
    Ok(())
}

async fn list(
    ctx: &Context,
    shop: &Storefront,
    product: &str,
    sort: ReviewSort,
    limit: Option<u32>,
) -> Result<()> {
    let mut panel = shop.review_panel();
    if let Some(limit) = limit {
        panel = panel.with_limit(limit);
    }
    panel.set_sort(sort).await;
    load(ctx, &panel, product).await?;

    let state = panel.state();
    if ctx.output.is_json() {
        ctx.output.json(&state.reviews);
        return Ok(());
    }

    if state.reviews.is_empty() {
        ctx.output.info("No reviews yet");
        return Ok(());
    }

    ctx.output.header(&format!(
        "Reviews for product {} ({})",
        product,
        sort.as_query()
    ));
    for review in &state.reviews {
        print_review(review, panel.can_delete(review));
    }
    Ok(())
}

fn print_review(review: &Review, own: bool) {
    let date = review
        .created_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let mine = if own { " (yours)" } else { "" };
    println!(
        "\n  {} {}{} {}",
        stars(review.rating),
        style(review.author()).bold(),
        mine,
        style(date).dim()
    );
    if !review.comment.is_empty() {
        println!("    {}", review.comment);
    }
    println!(
        "    {} ▲ {}  ▼ {}",
        style(review.id.as_str()).dim(),
        review.upvotes,
        review.downvotes
    );
}

async fn stats(ctx: &Context, shop: &Storefront, product: &str) -> Result<()> {
    let panel = shop.review_panel();
    load(ctx, &panel, product).await?;

    let stats = panel.state().stats.unwrap_or_default();
    if ctx.output.is_json() {
        ctx.output.json(&stats);
        return Ok(());
    }

    ctx.output.header(&format!("Ratings for product {}", product));
    println!(
        "  {} {:.1} out of 5 ({} reviews)\n",
        stars(stats.average_rating.round() as u8),
        stats.average_rating,
        stats.total_reviews
    );
    for row in panel.bars() {
        println!(
            "  {} star  {}  {:>3}",
            row.stars,
            bar(row.percent, 20),
            row.count
        );
    }
    Ok(())
}

async fn vote(
    ctx: &Context,
    shop: &Storefront,
    product: &str,
    review: &str,
    direction: VoteType,
) -> Result<()> {
    let panel = shop.review_panel();
    load(ctx, &panel, product).await?;

    let review_id = ReviewId::new(review);
    panel.vote(&review_id, direction).await?;

    let updated = panel
        .state()
        .reviews
        .into_iter()
        .find(|r| r.id == review_id);
    match updated {
        Some(r) if ctx.output.is_json() => ctx.output.json(&r),
        Some(r) => ctx.output.success(&format!(
            "Vote recorded: ▲ {}  ▼ {}",
            r.upvotes, r.downvotes
        )),
        None => ctx.output.success("Vote recorded"),
    }
    Ok(())
}

async fn delete(
    ctx: &Context,
    shop: &Storefront,
    product: &str,
    review: &str,
    yes: bool,
) -> Result<()> {
    let panel = shop.review_panel();
    load(ctx, &panel, product).await?;

    if !yes
        && !Confirm::new()
            .with_prompt("Delete this review?")
            .default(false)
            .interact()?
    {
        ctx.output.info("Cancelled");
        return Ok(());
    }

    panel.delete(&ReviewId::new(review)).await?;
    Ok(())
}

async fn write(
    ctx: &Context,
    shop: &Storefront,
    product: &str,
    rating: u8,
    comment: Option<String>,
) -> Result<()> {
    if shop.current_user().is_none() {
        bail!("Log in to write a review (shop login)");
    }

    let comment = match comment {
        Some(comment) => comment,
        None => Input::<String>::new()
            .with_prompt("Your review")
            .interact_text()?,
    };

    let panel = shop.review_panel();
    load(ctx, &panel, product).await?;

    let spinner = ctx.output.spinner("Posting review...");
    let result = panel.submit(rating, &comment).await;
    spinner.finish_and_clear();
    result?;

    ctx.output
        .debug(&format!("{} reviews now", panel.state().reviews.len()));
    Ok(())
}

#![doc = include_str!("../../README.md")]
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    clippy::branches_sharing_code,
    clippy::map_unwrap_or,
    clippy::match_wildcard_for_single_variants,
    // clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::needless_for_each,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::unreadable_literal,
    clippy::unwrap_used,
    clippy::expect_used,
    deprecated_in_future,
    ellipsis_inclusive_range_patterns,
    future_incompatible,
    missing_copy_implementations,
    missing_debug_implementations,
    // missing_docs,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2018_idioms,
    rust_2021_compatibility,
    rustdoc::bare_urls,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::private_intra_doc_links,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused,
    variant_size_differences
)]

use anyhow::{Context as _, Result};
use demo::{TestClearColor, TestMenu, TestTexture2D, TestUniformColor};
use quad_engine::{imgui::Ui, prelude::*};

mod demo;
mod trace;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    let _trace = trace::initialize();

    let config = Config::load(CONFIG_PATH).context("failed to load configuration")?;
    tracing::debug!("{config:?}");
    let engine = Engine::builder()
        .config(config)
        .build()
        .context("failed to build engine")?;

    let mut menu = TestMenu::new();
    menu.register("Clear Color", |_| Ok(TestClearColor::new()))
        .register("Uniform Color", |cx| TestUniformColor::new(cx.gl()))
        .register("Texture 2D", TestTexture2D::new);

    engine.run(Sandbox { menu })?;
    Ok(())
}

#[derive(Debug)]
#[must_use]
struct Sandbox {
    menu: TestMenu,
}

impl Application for Sandbox {
    fn on_start(&mut self, _cx: &mut Context) -> quad_engine::Result<()> {
        tracing::info!(
            "sandbox started with tests: {:?}",
            self.menu.names().collect::<Vec<_>>()
        );
        Ok(())
    }

    fn on_update(&mut self, delta_time: f32, _cx: &mut Context) -> quad_engine::Result<()> {
        self.menu.on_update(delta_time);
        Ok(())
    }

    fn on_render(&mut self, cx: &mut Context) -> quad_engine::Result<()> {
        Ok(self.menu.on_render(cx)?)
    }

    fn on_imgui(&mut self, ui: &Ui, cx: &mut Context) -> quad_engine::Result<()> {
        Ok(self.menu.on_imgui_render(ui, cx)?)
    }

    fn on_stop(&mut self, cx: &mut Context) {
        if let Err(err) = self.menu.close(cx) {
            tracing::error!("failed to close test: {err}");
        }
        tracing::info!("sandbox shutting down");
    }
}

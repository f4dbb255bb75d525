//! Aggregate helpers invoked by the document pipeline, plus the `math`
//! functions `RUN` can call by name.
//!
//! This crate's grammar has no function-call *expression* — `Value` carries
//! no `Function` variant, so a function can't be embedded inside another
//! expression the way the teacher's `fn::name(...)`/`math::max(...)` calls
//! can. `RUN name(args)` is the one place a function runs by name, and its
//! small registry (`sql/statements/run.rs`) calls straight into `math` here,
//! the same way `doc::table` does while folding a GROUP BY partition into a
//! materialized view's output record.

pub mod math;

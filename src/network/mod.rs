// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Handler middleware wrapped around every dispatch

mod interceptor;

pub use interceptor::{
    HeaderInjector, InterceptAction, InterceptorChain, RequestInterceptor, RequestLogger,
};

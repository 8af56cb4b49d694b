//! This file defines the templates and a convenience function for creating the navigation bar.

use maud::{Markup, html};

use crate::endpoints;

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
/// Disabled links are rendered as plain text.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
    is_disabled: bool,
}

impl Link<'_> {
    fn into_desktop_html(self) -> Markup {
        if self.is_disabled {
            return html!(
                span
                    class="block py-2 px-3 text-gray-400 cursor-not-allowed lg:p-0 dark:text-gray-500"
                    aria-disabled="true"
                    title="Select at least one transaction"
                {
                    (self.title)
                }
            );
        }

        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
        lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
        dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
    swap_oob: bool,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    /// The visualization link is disabled unless `has_active_transactions` is true.
    pub fn new(active_endpoint: &str, has_active_transactions: bool) -> NavBar<'_> {
        let links = vec![
            Link {
                url: endpoints::TRANSACTIONS_VIEW,
                title: "Transactions",
                is_current: active_endpoint == endpoints::TRANSACTIONS_VIEW,
                is_disabled: false,
            },
            Link {
                url: endpoints::VISUALIZATION_VIEW,
                title: "Visualization",
                is_current: active_endpoint == endpoints::VISUALIZATION_VIEW,
                is_disabled: !has_active_transactions,
            },
            Link {
                url: endpoints::IMPORT_VIEW,
                title: "Import",
                is_current: active_endpoint == endpoints::IMPORT_VIEW,
                is_disabled: false,
            },
        ];

        NavBar {
            links,
            swap_oob: false,
        }
    }

    /// Render the navigation bar as an out-of-band swap so that HTMX
    /// responses can refresh the disabled state of the links.
    pub fn swap_oob(mut self) -> Self {
        self.swap_oob = true;
        self
    }

    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav
                id="nav-bar"
                hx-swap-oob=[self.swap_oob.then_some("true")]
                class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Finview"
                        }
                    }

                    ul
                        class="font-medium flex flex-row space-x-4 lg:space-x-8
                        rtl:space-x-reverse"
                    {
                        @for link in self.links {
                            li { (link.into_desktop_html()) }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use std::collections::HashMap;

    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    #[test]
    fn set_active_endpoint() {
        let mut cases = HashMap::new();
        cases.insert(endpoints::TRANSACTIONS_VIEW, true);
        cases.insert(endpoints::VISUALIZATION_VIEW, true);
        cases.insert(endpoints::IMPORT_VIEW, true);

        cases.insert(endpoints::ROOT, false);
        cases.insert(endpoints::IMPORT, false);
        cases.insert(endpoints::SUMMARY_API, false);

        for (endpoint, should_be_active) in cases {
            let nav_bar = NavBar::new(endpoint, true);

            assert_link_active(nav_bar, endpoint, should_be_active);
        }
    }

    #[test]
    fn visualization_link_disabled_without_active_transactions() {
        let markup = NavBar::new(endpoints::TRANSACTIONS_VIEW, false)
            .into_html()
            .into_string();

        let html = Html::parse_fragment(&markup);
        let hrefs: Vec<_> = html
            .select(&Selector::parse("a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert!(!hrefs.contains(&endpoints::VISUALIZATION_VIEW));

        let disabled = html
            .select(&Selector::parse("[aria-disabled='true']").unwrap())
            .next()
            .expect("disabled link missing");
        assert_eq!(disabled.text().collect::<String>(), "Visualization");
    }

    #[track_caller]
    fn assert_link_active(nav_bar: NavBar<'_>, endpoint: &str, should_be_active: bool) {
        let get_active_string = |is_active: bool| -> &str {
            if is_active {
                "active (true)"
            } else {
                "inactive (false)"
            }
        };

        for link in nav_bar.links {
            if link.url == endpoint {
                assert_eq!(
                    link.is_current,
                    should_be_active,
                    "Link for current page should be {} but got {}",
                    get_active_string(should_be_active),
                    get_active_string(link.is_current),
                )
            } else {
                assert!(
                    !link.is_current,
                    "Link for inactive page should {} but got {}",
                    get_active_string(false),
                    get_active_string(link.is_current)
                )
            }
        }
    }
}

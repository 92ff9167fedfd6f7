use std::rc::Rc;

use log::{error, info};
use yew::prelude::*;
use yew_router::prelude::*;

mod config;
mod content;
mod pages {
    pub mod about;
}
mod viewport {
    pub mod browser;
    pub mod hook;
    pub mod tracker;
}

use content::AboutContent;
use pages::about::AboutPage;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/about")]
    About,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::About => {
            info!("Rendering About page");
            html! { <AboutPage /> }
        }
        // The site has a single page; everything else lands on it.
        Route::Home | Route::NotFound => {
            html! { <Redirect<Route> to={Route::About} /> }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub content: Rc<AboutContent>,
}

#[function_component]
fn App(props: &AppProps) -> Html {
    html! {
        <ContextProvider<Rc<AboutContent>> context={props.content.clone()}>
            <BrowserRouter basename={config::get_base_path()}>
                <Switch<Route> render={switch} />
            </BrowserRouter>
        </ContextProvider<Rc<AboutContent>>>
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    console_log::init_with_level(config::get_log_level()).expect("error initializing log");

    let content = match content::load() {
        Ok(content) => Rc::new(content),
        Err(err) => {
            error!("Not starting, page content is invalid: {}", err);
            return;
        }
    };

    info!("Starting application");
    yew::Renderer::<App>::with_props(AppProps { content }).render();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_resolve_to_expected_paths() {
        assert_eq!(Route::About.to_path(), "/about");
        assert_eq!(Route::Home.to_path(), "/");
        assert!(Route::recognize("/about") == Some(Route::About));
    }
}

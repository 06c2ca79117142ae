//! ViewModel → DomNode tree.
//!
//! Events are wired as `data-a_<event>` action names: `search_input`,
//! `toggle:<name>`, `select_sort`, `sort_header:<field>`, `set_layout:<layout>`.

use catalog_dom::DomNode;

use crate::ordering::{Direction, SortField, SortSpec};
use crate::predicate::{FilterGroup, Query, Toggle};
use crate::view::{Download, Layout, Link, ProfileView, Status, ViewModel};

const TITLE: &str = "Profile Catalog";

/// Columns of the table layout, in display order.
pub const TABLE_COLUMNS: [SortField; 12] = [
    SortField::Id,
    SortField::AvatarName,
    SortField::ProfileVersion,
    SortField::AvatarAuthor,
    SortField::ProfileAuthor,
    SortField::Official,
    SortField::ForwardSupport,
    SortField::ReverseSupport,
    SortField::Pricing,
    SortField::DownloadMethod,
    SortField::RegisteredDate,
    SortField::UpdatedDate,
];

pub fn render_view(view: &ViewModel) -> DomNode {
    DomNode::el("div")
        .key("catalog")
        .class("catalog")
        .class(&format!("layout-{}", view.layout.name()))
        .child(DomNode::el("catalog:head").child(DomNode::text("title", TITLE)))
        .child(header(view))
        .child(controls(view))
        .child(DomNode::text("p", &view.counts.label()).key("count").class("count"))
        .child(results(view))
}

fn header(view: &ViewModel) -> DomNode {
    let mut header = DomNode::el("header")
        .key("header")
        .class("catalog-header")
        .child(DomNode::text("h1", TITLE));
    if let Some(updated) = &view.last_updated {
        header = header.child(
            DomNode::text("p", &format!("Last updated: {updated}"))
                .key("last-updated")
                .class("last-updated"),
        );
    }
    if let Some(url) = &view.form_url {
        header = header.child(
            DomNode::text("a", "Request a new entry")
                .key("request-form")
                .class("request-form")
                .attr("href", url.as_str())
                .attr("target", "_blank")
                .attr("rel", "noopener"),
        );
    }
    header
}

fn controls(view: &ViewModel) -> DomNode {
    let search = DomNode::el("input")
        .key("search")
        .class("search")
        .attr("type", "search")
        .attr("name", "search")
        .attr("placeholder", "Search by avatar, author or notes")
        .attr("autocomplete", "off")
        .attr("value", view.query.term())
        .on("input", "search_input");

    DomNode::el("section")
        .key("controls")
        .class("controls")
        .child(search)
        .child(filters(&view.query))
        .child(sort_select(view.sort))
        .child(layout_switch(view.layout))
}

fn checkbox(toggle: Toggle, query: &Query) -> DomNode {
    let mut input = DomNode::el("input")
        .attr("type", "checkbox")
        .attr("name", toggle.name())
        .on("change", format!("toggle:{}", toggle.name()));
    if query.is_active(toggle) {
        input = input.attr("checked", "checked");
    }
    DomNode::el("label")
        .key(format!("toggle-{}", toggle.name()))
        .class("toggle")
        .child(input)
        .child(DomNode::text("span", toggle.label()))
}

fn filters(query: &Query) -> DomNode {
    let groups = FilterGroup::ALL.into_iter().map(|group| {
        DomNode::el("fieldset")
            .class("filter-group")
            .child(DomNode::text("legend", group.label()))
            .children(group.toggles().iter().map(|t| checkbox(*t, query)))
    });
    DomNode::el("div")
        .key("filters")
        .class("filters")
        .child(checkbox(Toggle::ShowAll, query))
        .children(groups)
}

fn sort_select(current: Option<SortSpec>) -> DomNode {
    let mut feed_order = DomNode::text("option", "Feed order").attr("value", "");
    if current.is_none() {
        feed_order = feed_order.attr("selected", "selected");
    }

    let options = SortField::ALL.into_iter().flat_map(|field| {
        [Direction::Asc, Direction::Desc].into_iter().map(move |direction| {
            let spec = SortSpec::new(field, direction);
            let arrow = if direction == Direction::Asc { "↑" } else { "↓" };
            let mut opt = DomNode::text("option", &format!("{} {arrow}", field.label()))
                .attr("value", spec.to_string());
            if current == Some(spec) {
                opt = opt.attr("selected", "selected");
            }
            opt
        })
    });

    DomNode::el("select")
        .key("sort")
        .class("sort-select")
        .attr("name", "sort")
        .on("change", "select_sort")
        .child(feed_order)
        .children(options)
}

fn layout_switch(current: Layout) -> DomNode {
    let buttons = [Layout::Cards, Layout::Table].into_iter().map(|layout| {
        let label = match layout {
            Layout::Cards => "Cards",
            Layout::Table => "Table",
        };
        let mut button = DomNode::text("button", label)
            .key(format!("layout-{}", layout.name()))
            .attr("type", "button")
            .on("click", format!("set_layout:{}", layout.name()));
        if layout == current {
            button = button.class("active").attr("aria-pressed", "true");
        }
        button
    });
    DomNode::el("div").key("layout").class("layout-switch").children(buttons)
}

fn results(view: &ViewModel) -> DomNode {
    let container = DomNode::el("div").key("results").class("results");
    match &view.status {
        Status::Loading => container.child(DomNode::text("p", "Loading…").class("loading")),
        Status::Failed(msg) => container.child(
            DomNode::el("div")
                .class("error")
                .attr("role", "alert")
                .child(DomNode::text("p", "The profile list could not be loaded."))
                .child(DomNode::text("p", msg).class("error-detail")),
        ),
        Status::Empty => container.child(DomNode::text("p", "No matching profiles.").class("empty")),
        Status::Ready => match view.layout {
            Layout::Cards => container.children(view.rows.iter().map(card)),
            Layout::Table => container.child(table(view)),
        },
    }
}

fn link_or_text(tag_class: &str, link: &Link) -> DomNode {
    match &link.href {
        Some(href) => DomNode::text("a", &link.text)
            .class(tag_class)
            .attr("href", href.as_str())
            .attr("target", "_blank")
            .attr("rel", "noopener"),
        None => DomNode::text("span", &link.text).class(tag_class),
    }
}

fn download(row: &ProfileView) -> DomNode {
    let label = if row.download_method.is_empty() { "Download" } else { row.download_method.as_str() };
    match &row.download {
        Download::Link { href } => DomNode::text("a", label)
            .class("download-link")
            .attr("href", href.as_str())
            .attr("target", "_blank")
            .attr("rel", "noopener"),
        Download::Disabled => DomNode::text("span", label)
            .class("download-link")
            .class("disabled")
            .attr("aria-disabled", "true"),
    }
}

fn price(row: &ProfileView) -> DomNode {
    let mut text = row.price.category.clone();
    if let Some(amount) = &row.price.amount {
        text.push(' ');
        text.push_str(amount);
    }
    let mut badge = DomNode::text("span", &text).class("badge").class(row.price.class);
    if let Some(avatar) = &row.avatar_price {
        badge = badge.attr("title", format!("Avatar price {avatar}"));
    }
    badge
}

fn notes_indicator(row: &ProfileView) -> Option<DomNode> {
    row.notes.as_ref().map(|notes| {
        DomNode::text("span", "Notes")
            .class("notes-indicator")
            .attr("title", notes.as_str())
    })
}

fn card(row: &ProfileView) -> DomNode {
    let mut card = DomNode::el("article").key(format!("profile-{}", row.id)).class("profile-card");
    if let Some(image) = &row.image {
        card = card.child(
            DomNode::el("img")
                .class("profile-image")
                .attr("src", image.src.as_str())
                .attr("alt", image.alt.as_str())
                .attr("loading", "lazy"),
        );
    }

    let badges = DomNode::el("div")
        .class("badges")
        .child(DomNode::text("span", row.official.label).class("badge").class(row.official.class))
        .child(DomNode::text("span", &row.forward.label).class("badge").class(row.forward.class()))
        .child(DomNode::text("span", &row.reverse.label).class("badge").class(row.reverse.class()))
        .child(price(row));

    let mut meta = DomNode::el("dl")
        .class("meta")
        .child(DomNode::text("dt", "Version"))
        .child(DomNode::text("dd", &row.version))
        .child(DomNode::text("dt", "Avatar author"))
        .child(DomNode::el("dd").child(link_or_text("avatar-author", &row.avatar_author)))
        .child(DomNode::text("dt", "Profile author"))
        .child(DomNode::el("dd").child(link_or_text("profile-author", &row.profile_author)));
    if let Some(avatar_price) = &row.avatar_price {
        meta = meta
            .child(DomNode::text("dt", "Avatar price"))
            .child(DomNode::text("dd", avatar_price));
    }
    meta = meta
        .child(DomNode::text("dt", "Registered"))
        .child(DomNode::text("dd", &row.registered))
        .child(DomNode::text("dt", "Updated"))
        .child(DomNode::text("dd", &row.updated));

    let mut footer = DomNode::el("footer").class("card-footer").child(download(row));
    if let Some(notes) = notes_indicator(row) {
        footer = footer.child(notes);
    }

    card.child(
        DomNode::el("h2")
            .class("avatar-name")
            .child(DomNode::text("span", &row.id).class("profile-id"))
            .child(link_or_text("avatar-link", &row.avatar)),
    )
    .child(badges)
    .child(meta)
    .child(footer)
}

fn header_cell(field: SortField, sort: Option<SortSpec>) -> DomNode {
    let mut th = DomNode::text("th", field.label())
        .class("sortable")
        .attr("data-sort", field.name())
        .on("click", format!("sort_header:{}", field.name()));
    if let Some(spec) = sort.filter(|s| s.field == field) {
        th = match spec.direction {
            Direction::Asc => th.class("sorted-asc").attr("aria-sort", "ascending"),
            Direction::Desc => th.class("sorted-desc").attr("aria-sort", "descending"),
        };
    }
    th
}

fn row_cell(field: SortField, row: &ProfileView) -> DomNode {
    let td = DomNode::el("td").class(field.name());
    match field {
        SortField::Id => td.with_text(&row.id),
        SortField::AvatarName => td.child(link_or_text("avatar-link", &row.avatar)),
        SortField::ProfileVersion => td.with_text(&row.version),
        SortField::AvatarAuthor => td.child(link_or_text("avatar-author", &row.avatar_author)),
        SortField::ProfileAuthor => td.child(link_or_text("profile-author", &row.profile_author)),
        SortField::Official => td.with_text(row.official.label).class(row.official.class),
        SortField::ForwardSupport => td.with_text(row.forward.mark).attr("title", row.forward.label.as_str()),
        SortField::ReverseSupport => td.with_text(row.reverse.mark).attr("title", row.reverse.label.as_str()),
        SortField::Pricing => td.child(price(row)),
        SortField::DownloadMethod => {
            let td = td.child(download(row));
            match notes_indicator(row) {
                Some(n) => td.child(n),
                None => td,
            }
        }
        SortField::RegisteredDate => td.with_text(&row.registered),
        SortField::UpdatedDate => td.with_text(&row.updated),
        _ => td,
    }
}

fn table(view: &ViewModel) -> DomNode {
    let head = DomNode::el("thead")
        .child(DomNode::el("tr").children(TABLE_COLUMNS.into_iter().map(|f| header_cell(f, view.sort))));
    let body = DomNode::el("tbody").children(view.rows.iter().map(|row| {
        DomNode::el("tr")
            .key(format!("row-{}", row.id))
            .children(TABLE_COLUMNS.into_iter().map(|f| row_cell(f, row)))
    }));
    DomNode::el("table").key("profile-table").class("profile-table").child(head).child(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Profile;
    use crate::view::{self, ViewContext};

    fn view_of(profiles: &[Profile], ctx: ViewContext<'_>) -> ViewModel {
        let refs: Vec<&Profile> = profiles.iter().collect();
        view::project(&refs, profiles.len(), &ctx)
    }

    #[test]
    fn test_disabled_download_and_notes_indicator() {
        let mut p = Profile::with_id("7");
        p.download_method = "Booth".into();
        p.notes = "Needs v2 base".into();
        let root = render_view(&view_of(&[p], ViewContext::default()));

        let mut links = Vec::new();
        root.find_all_by_class("download-link", &mut links);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].tag, "span");
        assert!(links[0].has_class("disabled"));
        assert_eq!(links[0].get_attr("aria-disabled"), Some("true"));

        let mut notes = Vec::new();
        root.find_all_by_class("notes-indicator", &mut notes);
        assert_eq!(notes[0].get_attr("title"), Some("Needs v2 base"));
    }

    #[test]
    fn test_unset_prices_render_as_not_set() {
        let unpriced = Profile::with_id("1");
        let mut paid = Profile::with_id("2");
        paid.pricing = crate::model::Pricing::PaidStandalone;
        let root = render_view(&view_of(&[unpriced, paid], ViewContext::default()));

        let mut badges = Vec::new();
        root.find_all_by_class("price-unknown", &mut badges);
        assert_eq!(badges[0].text_content(), "Not set");
        let mut paid_badges = Vec::new();
        root.find_all_by_class("price-paid", &mut paid_badges);
        assert_eq!(paid_badges[0].text_content(), "Paid not set");
        assert!(!root.find_key("profile-2").unwrap().text_content().contains("¥0"));
    }

    #[test]
    fn test_empty_state_and_count() {
        let root = render_view(&view_of(&[], ViewContext::default()));
        let results = root.find_key("results").unwrap();
        assert_eq!(results.text_content(), "No matching profiles.");
        assert_eq!(root.find_key("count").unwrap().text_content(), "0 / 0 items");
    }

    #[test]
    fn test_request_link_only_with_form_url() {
        let without = render_view(&view_of(&[], ViewContext::default()));
        assert!(without.find_key("request-form").is_none());
        let ctx = ViewContext { form_url: Some("https://forms.example/new"), ..ViewContext::default() };
        let with = render_view(&view_of(&[], ctx));
        assert_eq!(
            with.find_key("request-form").unwrap().get_attr("href"),
            Some("https://forms.example/new")
        );
    }

    #[test]
    fn test_table_headers_carry_sort_state() {
        let ctx = ViewContext {
            layout: Layout::Table,
            sort: Some(SortSpec::desc(SortField::UpdatedDate)),
            ..ViewContext::default()
        };
        let root = render_view(&view_of(&[Profile::with_id("1")], ctx));
        let mut sorted = Vec::new();
        root.find_all_by_class("sorted-desc", &mut sorted);
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].get_attr("data-sort"), Some("updatedDate"));
        assert_eq!(sorted[0].event("click"), Some("sort_header:updatedDate"));
        assert!(root.find_key("row-1").is_some());
    }

    #[test]
    fn test_controls_reflect_query() {
        let q = Query::new().with(Toggle::Paid).with_term("karin");
        let ctx = ViewContext { query: Some(&q), ..ViewContext::default() };
        let root = render_view(&view_of(&[], ctx));
        assert_eq!(root.find_key("search").unwrap().get_attr("value"), Some("karin"));
        let paid = root.find_key("toggle-paid").unwrap();
        assert_eq!(paid.children_iter()[0].get_attr("checked"), Some("checked"));
        assert_eq!(paid.children_iter()[0].event("change"), Some("toggle:paid"));
        let all = root.find_key("toggle-showAll").unwrap();
        assert_eq!(all.children_iter()[0].get_attr("checked"), None);
    }

    #[test]
    fn test_sort_select_lists_derived_ids() {
        let root = render_view(&view_of(&[], ViewContext::default()));
        let select = root.find_key("sort").unwrap();
        let values: Vec<_> = select.children_iter().iter().filter_map(|o| o.get_attr("value")).collect();
        assert!(values.contains(&"avatarItemId-asc"));
        assert!(values.contains(&"profileItemId-desc"));
        assert_eq!(select.children_iter()[0].get_attr("selected"), Some("selected"));
    }
}

//! Placeholder shapes.
//!
//! A skeleton is a structural description of what a placeholder looks like
//! while content is pending. Reveal delays are cosmetic; nothing depends on
//! them beyond ordering elements for display.

use std::fmt;
use std::time::Duration;

/// Region of the layout a boundary occupies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FallbackKind {
    Header,
    Sidebar,
    Content,
    Breadcrumb,
    BottomNav,
    #[default]
    Default,
}

impl fmt::Display for FallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::Sidebar => "sidebar",
            Self::Content => "content",
            Self::Breadcrumb => "breadcrumb",
            Self::BottomNav => "bottom-nav",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}

/// Content layout, consulted only for [`FallbackKind::Content`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentVariant {
    #[default]
    Page,
    Table,
    Form,
}

impl fmt::Display for ContentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Page => "page",
            Self::Table => "table",
            Self::Form => "form",
        };
        f.write_str(name)
    }
}

/// The overall shape of a skeleton.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkeletonShape {
    HeaderBar,
    SidebarMenu,
    BreadcrumbTrail,
    BottomNavigation,
    PageGrid,
    Table,
    Form,
    Spinner,
}

/// What a single placeholder element stands in for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementRole {
    Logo,
    Title,
    Avatar,
    MenuItem,
    Crumb,
    NavItem,
    Card,
    TableHeader,
    TableRow,
    Label,
    Input,
    Action,
    Spinner,
}

/// One element of a skeleton with its reveal offset from fallback display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkeletonElement {
    pub role: ElementRole,
    pub reveal_delay: Duration,
}

/// A complete placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skeleton {
    pub shape: SkeletonShape,
    pub elements: Vec<SkeletonElement>,
}

/// Reveal delay of the element at `index`; saturates instead of wrapping.
fn stagger_step(stagger: Duration, index: usize) -> Duration {
    stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}

impl Skeleton {
    /// Builds a skeleton whose elements reveal one `stagger` apart.
    pub fn staggered(
        shape: SkeletonShape,
        roles: impl IntoIterator<Item = ElementRole>,
        stagger: Duration,
    ) -> Self {
        let elements = roles
            .into_iter()
            .enumerate()
            .map(|(i, role)| SkeletonElement {
                role,
                reveal_delay: stagger_step(stagger, i),
            })
            .collect();
        Self { shape, elements }
    }

    /// Number of elements with the given role.
    pub fn count(&self, role: ElementRole) -> usize {
        self.elements.iter().filter(|e| e.role == role).count()
    }

    /// Delay until the last element is revealed.
    pub fn fully_revealed_after(&self) -> Duration {
        self.elements
            .iter()
            .map(|e| e.reveal_delay)
            .max()
            .unwrap_or_default()
    }
}

/// Knobs for generated skeletons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkeletonOptions {
    pub table_rows: usize,
    pub table_columns: usize,
    pub form_fields: usize,
    pub menu_items: usize,
    pub stagger: Duration,
}

impl Default for SkeletonOptions {
    fn default() -> Self {
        Self {
            table_rows: 5,
            table_columns: 4,
            form_fields: 4,
            menu_items: 6,
            stagger: Duration::from_millis(50),
        }
    }
}

/// Picks the skeleton for a kind/variant pair.
pub fn select(kind: FallbackKind, variant: ContentVariant, options: &SkeletonOptions) -> Skeleton {
    use ElementRole::*;

    let stagger = options.stagger;
    match kind {
        FallbackKind::Header => {
            Skeleton::staggered(SkeletonShape::HeaderBar, [Logo, Title, Avatar], stagger)
        }
        FallbackKind::Sidebar => Skeleton::staggered(
            SkeletonShape::SidebarMenu,
            std::iter::repeat(MenuItem).take(options.menu_items),
            stagger,
        ),
        FallbackKind::Breadcrumb => {
            Skeleton::staggered(SkeletonShape::BreadcrumbTrail, [Crumb, Crumb, Crumb], stagger)
        }
        FallbackKind::BottomNav => Skeleton::staggered(
            SkeletonShape::BottomNavigation,
            [NavItem, NavItem, NavItem, NavItem],
            stagger,
        ),
        FallbackKind::Content => match variant {
            ContentVariant::Page => Skeleton::staggered(
                SkeletonShape::PageGrid,
                std::iter::once(Title).chain(std::iter::repeat(Card).take(6)),
                stagger,
            ),
            ContentVariant::Table => {
                // Header cells reveal together; rows reveal one stagger apart.
                let mut elements: Vec<_> = (0..options.table_columns)
                    .map(|_| SkeletonElement {
                        role: TableHeader,
                        reveal_delay: Duration::ZERO,
                    })
                    .collect();
                elements.extend((0..options.table_rows).map(|row| SkeletonElement {
                    role: TableRow,
                    reveal_delay: stagger_step(stagger, row.saturating_add(1)),
                }));
                Skeleton {
                    shape: SkeletonShape::Table,
                    elements,
                }
            }
            ContentVariant::Form => Skeleton::staggered(
                SkeletonShape::Form,
                std::iter::repeat([Label, Input])
                    .take(options.form_fields)
                    .flatten()
                    .chain([Action, Action]),
                stagger,
            ),
        },
        FallbackKind::Default => {
            Skeleton::staggered(SkeletonShape::Spinner, [Spinner], stagger)
        }
    }
}

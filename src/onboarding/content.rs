use crate::ui::span::{Span, SpanLine, wrap};
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub title: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callout {
    Stats(&'static [Stat]),
    Tip {
        title: &'static str,
        body: &'static str,
    },
}

/// Static copy of an informational step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub heading: &'static str,
    pub intro: &'static str,
    pub cards: &'static [Card],
    /// Cards are rendered as a numbered timeline.
    pub numbered: bool,
    pub callout: Option<Callout>,
}

pub const WELCOME: Section = Section {
    heading: "Welcome to Our Platform!",
    intro: "We're excited to have you on board. This quick onboarding process will help you get started and make the most of our platform.",
    cards: &[
        Card {
            title: "Quick Setup",
            body: "Get started in just 3-5 minutes with our streamlined onboarding process.",
        },
        Card {
            title: "Personalized Experience",
            body: "We'll tailor the platform to your needs and preferences.",
        },
        Card {
            title: "Ready to Begin?",
            body: "Click \"Next\" below to start your onboarding journey and unlock the full potential of our platform.",
        },
    ],
    numbered: false,
    callout: None,
};

pub const PROCESS: Section = Section {
    heading: "How We Work Together",
    intro: "Our proven process ensures successful collaboration and exceptional results",
    cards: &[
        Card {
            title: "Discovery & Planning",
            body: "We start by understanding your needs and defining clear objectives for the project.",
        },
        Card {
            title: "Design & Development",
            body: "Our team creates mockups and prototypes, then builds your solution with iterative feedback.",
        },
        Card {
            title: "Testing & Quality Assurance",
            body: "Rigorous testing ensures everything works perfectly before launch.",
        },
        Card {
            title: "Launch & Support",
            body: "We deploy your solution and provide ongoing support to ensure continued success.",
        },
    ],
    numbered: true,
    callout: Some(Callout::Stats(&[
        Stat {
            value: "4-6 weeks",
            label: "Average Timeline",
        },
        Stat {
            value: "98%",
            label: "Success Rate",
        },
    ])),
};

pub const GUIDELINES: Section = Section {
    heading: "Our Core Values & Guidelines",
    intro: "Working principles that guide our collaboration and ensure success",
    cards: &[
        Card {
            title: "Communication",
            body: "Keep communication clear and timely. We value transparency and regular updates throughout the project.",
        },
        Card {
            title: "Quality Standards",
            body: "We maintain high standards for code quality, accessibility, and user experience in all deliverables.",
        },
        Card {
            title: "Feedback & Iteration",
            body: "Provide feedback early and often. Iterative improvement is key to achieving the best results.",
        },
        Card {
            title: "Respect & Professionalism",
            body: "We foster a respectful, inclusive environment where everyone's contributions are valued.",
        },
    ],
    numbered: false,
    callout: None,
};

pub const START: Section = Section {
    heading: "You're All Set!",
    intro: "Welcome aboard! You've completed the onboarding process and you're ready to get started.",
    cards: &[
        Card {
            title: "Access Your Dashboard",
            body: "Explore your personalized dashboard and get familiar with the platform's features.",
        },
        Card {
            title: "Start Your First Project",
            body: "Ready to begin? Create your first project and put what you've learned into action.",
        },
        Card {
            title: "Get Support",
            body: "Need help? Our support team is available to answer questions and provide guidance.",
        },
    ],
    numbered: false,
    callout: Some(Callout::Tip {
        title: "Pro Tip",
        body: "Click \"Complete\" below to finish setup and access your personalized dashboard. You can always revisit these settings later from your account preferences.",
    }),
};

fn indented(lines: Vec<SpanLine>, indent: &str) -> impl Iterator<Item = SpanLine> + '_ {
    lines.into_iter().map(move |mut line| {
        line.insert(0, Span::new(indent));
        line
    })
}

impl Section {
    pub fn render(&self, width: usize, theme: &Theme) -> Vec<SpanLine> {
        let width = width.max(20);
        let mut lines = vec![vec![Span::styled(self.heading, theme.heading)]];
        lines.extend(wrap(self.intro, width, theme.muted));

        for (index, card) in self.cards.iter().enumerate() {
            lines.push(Vec::new());
            let marker = if self.numbered {
                format!("{}. ", index + 1)
            } else {
                "• ".to_string()
            };
            lines.push(vec![
                Span::styled(marker, theme.accent),
                Span::styled(card.title, theme.heading),
            ]);
            lines.extend(indented(wrap(card.body, width - 3, theme.text), "   "));
        }

        match self.callout {
            Some(Callout::Stats(stats)) => {
                lines.push(Vec::new());
                let mut line = Vec::new();
                for (index, stat) in stats.iter().enumerate() {
                    if index > 0 {
                        line.push(Span::styled("   │   ", theme.muted));
                    }
                    line.push(Span::styled(stat.value, theme.accent));
                    line.push(Span::new(" "));
                    line.push(Span::styled(stat.label, theme.muted));
                }
                lines.push(line);
            }
            Some(Callout::Tip { title, body }) => {
                lines.push(Vec::new());
                lines.push(vec![Span::styled(title, theme.accent)]);
                lines.extend(indented(wrap(body, width - 3, theme.muted), "   "));
            }
            None => {}
        }
        lines
    }
}

use std::ops::{Index, IndexMut};

/// Per-team match statistics scraped from the match logs.
///
/// The column names are the canonical headers of the raw tables; every
/// windowed feature is derived from exactly this vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    TotalShots,
    ShotsOnTarget,
    ShotsOnTargetPct,
    GoalsPerShot,
    TotalTouches,
    TouchesDefPenArea,
    TouchesDefThird,
    TouchesMidThird,
    TouchesAttThird,
    TouchesAttPenArea,
    DribblesAttempted,
    SuccessfulDribbles,
    SuccessfulDribblePct,
    TotalCarries,
    TotalCarryDistance,
    ProgressiveCarryDistance,
    ProgressiveCarries,
    CarriesIntoFinalThird,
    CarriesIntoPenArea,
    Tackles,
    TacklesWon,
    TacklesDefThird,
    TacklesMidThird,
    TacklesAttThird,
    DribblersTackled,
    TotalDribblesAgainst,
    DefensiveDribblersWinPct,
    Interceptions,
    ErrorsLeadingToGoal,
    KeyPasses,
    PassesCompleted,
    PassesAttempted,
    PassesIntoFinalThird,
    ProgressivePasses,
    ShotsOnTargetAgainst,
    KeeperSaves,
    KeeperSavePct,
}

pub const STAT_COUNT: usize = 37;

impl Stat {
    pub const ALL: [Stat; STAT_COUNT] = [
        Stat::TotalShots,
        Stat::ShotsOnTarget,
        Stat::ShotsOnTargetPct,
        Stat::GoalsPerShot,
        Stat::TotalTouches,
        Stat::TouchesDefPenArea,
        Stat::TouchesDefThird,
        Stat::TouchesMidThird,
        Stat::TouchesAttThird,
        Stat::TouchesAttPenArea,
        Stat::DribblesAttempted,
        Stat::SuccessfulDribbles,
        Stat::SuccessfulDribblePct,
        Stat::TotalCarries,
        Stat::TotalCarryDistance,
        Stat::ProgressiveCarryDistance,
        Stat::ProgressiveCarries,
        Stat::CarriesIntoFinalThird,
        Stat::CarriesIntoPenArea,
        Stat::Tackles,
        Stat::TacklesWon,
        Stat::TacklesDefThird,
        Stat::TacklesMidThird,
        Stat::TacklesAttThird,
        Stat::DribblersTackled,
        Stat::TotalDribblesAgainst,
        Stat::DefensiveDribblersWinPct,
        Stat::Interceptions,
        Stat::ErrorsLeadingToGoal,
        Stat::KeyPasses,
        Stat::PassesCompleted,
        Stat::PassesAttempted,
        Stat::PassesIntoFinalThird,
        Stat::ProgressivePasses,
        Stat::ShotsOnTargetAgainst,
        Stat::KeeperSaves,
        Stat::KeeperSavePct,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column_name(self) -> &'static str {
        match self {
            Stat::TotalShots => "Total Shots",
            Stat::ShotsOnTarget => "Shots on Target",
            Stat::ShotsOnTargetPct => "Shots on Target %",
            Stat::GoalsPerShot => "Goals per Shot",
            Stat::TotalTouches => "Total Touches",
            Stat::TouchesDefPenArea => "Touches in Defensive Penalty Area",
            Stat::TouchesDefThird => "Touches in Defensive Third",
            Stat::TouchesMidThird => "Touches in Midfield Third",
            Stat::TouchesAttThird => "Touches in Attacking Third",
            Stat::TouchesAttPenArea => "Touches in Attacking Penalty Area",
            Stat::DribblesAttempted => "Dribbles Attempted",
            Stat::SuccessfulDribbles => "Successful Dribbles",
            Stat::SuccessfulDribblePct => "Successful Dribble %",
            Stat::TotalCarries => "Total Carries",
            Stat::TotalCarryDistance => "Total Carry Distance",
            Stat::ProgressiveCarryDistance => "Progressive Carry Distance",
            Stat::ProgressiveCarries => "Progressive Carries",
            Stat::CarriesIntoFinalThird => "Carries into Final Third",
            Stat::CarriesIntoPenArea => "Carries into Penalty Area",
            Stat::Tackles => "Tackles",
            Stat::TacklesWon => "Tackles Won",
            Stat::TacklesDefThird => "Tackles in Defensive Third",
            Stat::TacklesMidThird => "Tackles in Midfield Third",
            Stat::TacklesAttThird => "Tackles in Attacking Third",
            Stat::DribblersTackled => "Dribblers Tackled",
            Stat::TotalDribblesAgainst => "Total Dribbles Against",
            Stat::DefensiveDribblersWinPct => "Defensive Dribblers Win %",
            Stat::Interceptions => "Interceptions",
            Stat::ErrorsLeadingToGoal => "Errors Leading to Goal",
            Stat::KeyPasses => "Key Passes",
            Stat::PassesCompleted => "Passes Completed",
            Stat::PassesAttempted => "Passes Attempted",
            Stat::PassesIntoFinalThird => "Passes into Final Third",
            Stat::ProgressivePasses => "Progressive Passes",
            Stat::ShotsOnTargetAgainst => "Shots on Target Against",
            Stat::KeeperSaves => "Keeper Saves",
            Stat::KeeperSavePct => "Keeper Save Percentage",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Stat> {
        Stat::ALL
            .iter()
            .copied()
            .find(|stat| stat.column_name() == name.trim())
    }
}

/// One value slot per [`Stat`]; `None` is a missing cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatLine([Option<f64>; STAT_COUNT]);

impl StatLine {
    pub fn empty() -> Self {
        Self([None; STAT_COUNT])
    }

    pub fn get(&self, stat: Stat) -> Option<f64> {
        self.0[stat.index()]
    }

    pub fn set(&mut self, stat: Stat, value: Option<f64>) {
        self.0[stat.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, Option<f64>)> + '_ {
        Stat::ALL.iter().map(|stat| (*stat, self.get(*stat)))
    }

    pub fn filled(&self) -> usize {
        self.0.iter().filter(|v| v.is_some()).count()
    }
}

impl Default for StatLine {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<Stat> for StatLine {
    type Output = Option<f64>;

    fn index(&self, stat: Stat) -> &Self::Output {
        &self.0[stat.index()]
    }
}

impl IndexMut<Stat> for StatLine {
    fn index_mut(&mut self, stat: Stat) -> &mut Self::Output {
        &mut self.0[stat.index()]
    }
}
